//! A source line being edited by hooks
//!
//! Hooks only ever insert text. Every insertion is remembered together with
//! the column of the original line it belongs to, so a later hook can still
//! address a column of the *original* line no matter what was inserted
//! before it.

#[derive(Debug, Clone, Copy)]
struct Insertion {
    /// Byte position in the edited text
    at: usize,
    len: usize,
    /// Column of the original line the text was inserted at
    column: usize,
}

#[derive(Debug, Clone)]
pub struct LineBuf {
    line_no: usize,
    text: String,
    original_len: usize,
    insertions: Vec<Insertion>,
}

impl LineBuf {
    pub fn new(line_no: usize, original: &str) -> Self {
        Self {
            line_no,
            text: original.to_string(),
            original_len: original.len(),
            insertions: Vec::new(),
        }
    }

    /// 1-based line number in the original file
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Insert in front of everything, including earlier insertions
    pub fn prepend(&mut self, snippet: &str) {
        self.insert_raw(0, 0, snippet);
    }

    /// Insert after everything, including earlier insertions
    pub fn append(&mut self, snippet: &str) {
        let at = self.text.len();
        self.insert_raw(at, self.original_len, snippet);
    }

    /// Insert at a column of the original line
    ///
    /// Text inserted earlier at the same column stays in front.
    pub fn insert_at(&mut self, column: usize, snippet: &str) {
        let column = column.min(self.original_len);
        let shift: usize = self
            .insertions
            .iter()
            .filter(|ins| ins.column <= column)
            .map(|ins| ins.len)
            .sum();
        let mut at = (column + shift).min(self.text.len());
        while !self.text.is_char_boundary(at) {
            at += 1;
        }
        self.insert_raw(at, column, snippet);
    }

    /// Insert right before the first occurrence of `needle` in the edited text
    ///
    /// Returns `false` (and leaves the line untouched) when `needle` is absent.
    pub fn insert_before_first(&mut self, needle: &str, snippet: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        let Some(at) = self.text.find(needle) else {
            return false;
        };
        let inserted_before: usize = self
            .insertions
            .iter()
            .filter(|ins| ins.at + ins.len <= at)
            .map(|ins| ins.len)
            .sum();
        self.insert_raw(at, at - inserted_before, snippet);
        true
    }

    fn insert_raw(&mut self, at: usize, column: usize, snippet: &str) {
        if snippet.is_empty() {
            return;
        }
        for ins in &mut self.insertions {
            if ins.at >= at {
                ins.at += snippet.len();
            }
        }
        self.text.insert_str(at, snippet);
        self.insertions.push(Insertion { at, len: snippet.len(), column });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepend_and_append() {
        let mut line = LineBuf::new(3, "\t}");
        line.prepend("A;");
        line.prepend("B;");
        line.append("C");
        assert_eq!(line.as_str(), "B;A;\t}C");
        assert_eq!(line.line_no(), 3);
    }

    #[test]
    fn test_insert_at_original_column_after_prepend() {
        //            0123456789
        let mut line = LineBuf::new(1, "go func() { y() }()");
        line.prepend("sdk.C(g, e);");
        line.insert_at(11, "ENTER;");
        line.insert_at(16, "EXIT;");
        assert_eq!(line.as_str(), "sdk.C(g, e);go func() {ENTER; y() EXIT;}()");
    }

    #[test]
    fn test_insert_at_same_column_keeps_order() {
        let mut line = LineBuf::new(1, "ab");
        line.insert_at(1, "1");
        line.insert_at(1, "2");
        assert_eq!(line.as_str(), "a12b");
    }

    #[test]
    fn test_insert_at_clamps_to_line_end() {
        let mut line = LineBuf::new(1, "x");
        line.append("!");
        line.insert_at(40, "?");
        assert_eq!(line.as_str(), "x!?");
    }

    #[test]
    fn test_insert_before_first_tracks_columns() {
        let mut line = LineBuf::new(1, "\tgo worker(x)");
        line.prepend("P;");
        assert!(line.insert_before_first("worker", "func(){"));
        line.insert_at(13, "}()");
        assert_eq!(line.as_str(), "P;\tgo func(){worker(x)}()");
        assert!(!line.insert_before_first("missing", "z"));
    }
}
