//! Incremental construction of a [`FrameTree`]
//!
//! The front end calls into a [`BuildCursor`] in strict lexical pre-order:
//! every `enter_frame` nests under the frame opened last, every `exit_frame`
//! closes it again. The cursor keeps the descent path as an explicit stack of
//! arena indices.

use log::debug;

use super::{Frame, FrameKind, FrameTree, ImportSpec};
use crate::domain::{Anchor, FrameId, InstrumentError};

/// Mutable tree under construction (one per file)
#[derive(Debug)]
pub struct BuildCursor {
    frames: Vec<Frame>,
    /// Open frames from the root down to the innermost one
    open: Vec<FrameId>,
}

impl BuildCursor {
    /// Start a tree whose package frame spans `first_line..=last_line`
    pub fn new(package_name: impl Into<String>, first_line: usize, last_line: usize) -> Self {
        let name = package_name.into();
        let mut root = Frame::new(
            FrameKind::Package {
                name: name.clone(),
                imports: Vec::new(),
                import_anchor_line: None,
            },
            name,
            first_line,
            first_line,
        );
        root.body_end_line = last_line.max(first_line);
        root.block_end_line = root.body_end_line;

        Self {
            frames: vec![root],
            open: vec![FrameId::ROOT],
        }
    }

    /// Innermost open frame
    pub fn current(&self) -> FrameId {
        self.open.last().copied().unwrap_or(FrameId::ROOT)
    }

    /// Number of open frames below the root
    pub fn depth(&self) -> usize {
        self.open.len() - 1
    }

    /// Path the next child of the current frame would get
    pub fn inner_path(&self, discriminator: &str) -> String {
        let parent = &self.frames[self.current().index()];
        format!("{}.{}_{}", parent.path(), discriminator, parent.children.len() + 1)
    }

    /// Open a new frame as the last child of the current one and descend into it
    pub fn enter_frame(
        &mut self,
        kind: FrameKind,
        discriminator: &str,
        head_line: usize,
        body_begin_line: usize,
    ) -> FrameId {
        let path = self.inner_path(discriminator);
        let id = FrameId(self.frames.len());
        let parent = self.current();

        debug!("{}>> enter {} `{path}` at {head_line}", "  ".repeat(self.depth()), kind.label());

        self.frames.push(Frame::new(kind, path, head_line, body_begin_line.max(head_line)));
        self.frames[parent.index()].children.push(id);
        self.open.push(id);
        id
    }

    /// Close the current frame at `body_end_line` and ascend to its parent
    ///
    /// A frame already shortened by `mark_return` keeps its return line.
    pub fn exit_frame(&mut self, body_end_line: usize) -> Result<FrameId, InstrumentError> {
        if self.open.len() <= 1 {
            return Err(InstrumentError::NoOpenFrame);
        }
        let id = self.open.pop().ok_or(InstrumentError::NoOpenFrame)?;
        let frame = &mut self.frames[id.index()];
        let end = body_end_line.max(frame.body_begin_line);
        frame.block_end_line = end;
        if !frame.is_return {
            frame.body_end_line = end;
        }
        Ok(id)
    }

    /// An explicit `return` at `line` ends the innermost open frame early
    pub fn mark_return(&mut self, line: usize) {
        let current = self.current().index();
        let frame = &mut self.frames[current];
        frame.is_return = true;
        frame.body_end_line = line.max(frame.body_begin_line);
    }

    /// The natural end of the innermost open frame can never be reached
    pub fn mark_unreachable(&mut self) {
        let current = self.current().index();
        self.frames[current].is_unreachable = true;
    }

    /// Column where the innermost open frame's entry text goes
    pub fn set_open_anchor(&mut self, anchor: Anchor) {
        let current = self.current().index();
        self.frames[current].open_anchor = Some(anchor);
    }

    /// Column where the innermost open frame's block-end text goes
    pub fn set_close_anchor(&mut self, anchor: Anchor) {
        let current = self.current().index();
        self.frames[current].close_anchor = Some(anchor);
    }

    pub fn record_import(&mut self, spec: ImportSpec) {
        if let FrameKind::Package { imports, .. } = &mut self.frames[FrameId::ROOT.index()].kind {
            imports.push(spec);
        }
    }

    /// Remember the first top-level declaration line; later calls are ignored
    pub fn set_import_anchor(&mut self, line: usize) {
        if let FrameKind::Package { import_anchor_line, .. } =
            &mut self.frames[FrameId::ROOT.index()].kind
        {
            import_anchor_line.get_or_insert(line);
        }
    }

    /// Freeze the tree; every frame opened must have been closed
    pub fn finish(self) -> Result<FrameTree, InstrumentError> {
        if self.open.len() != 1 {
            return Err(InstrumentError::UnbalancedFrames { open: self.open.len() - 1 });
        }
        Ok(FrameTree::from_arena(self.frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_naming_counts_siblings() {
        let mut cursor = BuildCursor::new("main", 1, 30);
        cursor.enter_frame(FrameKind::Function { has_result: false }, "f", 3, 3);
        cursor.enter_frame(FrameKind::IfElse, "if", 4, 4);
        cursor.exit_frame(5).unwrap();
        cursor.enter_frame(FrameKind::IfElse, "else", 5, 5);
        cursor.exit_frame(7).unwrap();
        cursor.exit_frame(8).unwrap();
        let tree = cursor.finish().unwrap();

        let func = tree.get(tree.root().children[0]);
        let paths: Vec<&str> = func.children.iter().map(|&id| tree.get(id).path()).collect();
        assert_eq!(func.path(), "main.f_1");
        assert_eq!(paths, vec!["main.f_1.if_1", "main.f_1.else_2"]);
    }

    #[test]
    fn test_return_lowers_body_end() {
        let mut cursor = BuildCursor::new("main", 1, 30);
        let id = cursor.enter_frame(FrameKind::IfElse, "if", 4, 4);
        cursor.mark_return(5);
        cursor.exit_frame(6).unwrap();
        let tree = cursor.finish().unwrap();

        let frame = tree.get(id);
        assert!(frame.is_return);
        assert_eq!(frame.body_end_line, 5);
        assert_eq!(frame.block_end_line, 6);
    }

    #[test]
    fn test_mark_unreachable_on_innermost() {
        let mut cursor = BuildCursor::new("main", 1, 30);
        let outer = cursor.enter_frame(FrameKind::For, "for", 2, 2);
        let inner = cursor.enter_frame(FrameKind::IfElse, "if", 3, 3);
        cursor.mark_unreachable();
        cursor.exit_frame(4).unwrap();
        cursor.exit_frame(5).unwrap();
        let tree = cursor.finish().unwrap();

        assert!(tree.get(inner).is_unreachable);
        assert!(!tree.get(outer).is_unreachable);
    }

    #[test]
    fn test_imports_and_anchor() {
        let mut cursor = BuildCursor::new("demo", 1, 10);
        cursor.record_import(ImportSpec::new(None, "\"fmt\""));
        cursor.record_import(ImportSpec::new(Some("s"), "\"sync\""));
        cursor.set_import_anchor(3);
        cursor.set_import_anchor(8);
        let tree = cursor.finish().unwrap();

        assert_eq!(tree.imports(), [ImportSpec::new(None, "fmt"), ImportSpec::new(Some("s"), "sync")]);
        assert_eq!(tree.import_anchor_line(), Some(3));
        assert_eq!(tree.package_name(), "demo");
    }

    #[test]
    fn test_anchors_set_on_innermost() {
        let mut cursor = BuildCursor::new("main", 1, 10);
        let func = cursor.enter_frame(FrameKind::Function { has_result: false }, "f", 2, 2);
        cursor.set_open_anchor(Anchor::new(2, 10));
        let case = cursor.enter_frame(FrameKind::Case, "switch", 4, 4);
        cursor.set_close_anchor(Anchor::new(6, 1));
        cursor.exit_frame(6).unwrap();
        cursor.set_close_anchor(Anchor::new(8, 0));
        cursor.exit_frame(8).unwrap();
        let tree = cursor.finish().unwrap();

        assert_eq!(tree.get(func).open_anchor, Some(Anchor::new(2, 10)));
        assert_eq!(tree.get(func).close_anchor, Some(Anchor::new(8, 0)));
        assert_eq!(tree.get(case).open_anchor, None);
        assert_eq!(tree.get(case).close_anchor, Some(Anchor::new(6, 1)));
    }

    #[test]
    fn test_unbalanced_finish_fails() {
        let mut cursor = BuildCursor::new("main", 1, 10);
        cursor.enter_frame(FrameKind::For, "for", 2, 2);
        assert!(matches!(cursor.finish(), Err(InstrumentError::UnbalancedFrames { open: 1 })));
    }

    #[test]
    fn test_exit_without_open_frame_fails() {
        let mut cursor = BuildCursor::new("main", 1, 10);
        assert!(matches!(cursor.exit_frame(3), Err(InstrumentError::NoOpenFrame)));
    }
}
