//! # Frame Model
//!
//! A frame is one instrumentable lexical block of a Go file: a function body,
//! an `if`/`else` branch, a loop body, a `case` clause or a goroutine launch.
//! Frames form a tree rooted at the package frame.
//!
//! ## Storage
//!
//! All frames of a file live in a single arena (`Vec<Frame>`); children are
//! referenced by [`FrameId`]. The arena is append-only while the tree is
//! being built (see [`builder::BuildCursor`]) and read-only afterwards
//! ([`FrameTree`]), so there are no owning pointers and no back edges.
//!
//! ```text
//! main                     Package   1{1:40}40
//! ├── main.worker_1        Function  3{3:9}9
//! │   └── main.worker_1.for-range_1  For  4{4:8}8
//! └── main.main_2          Function  11{11:20}20
//!     ├── main.main_2.go-worker_1    GoRoutine  12{12:12}12
//!     └── main.main_2.if_2           IfElse     13{13:15}14 [return]
//! ```

pub mod builder;

use std::fmt;

use crate::domain::{Anchor, FrameId};

pub use builder::BuildCursor;

/// Column anchors of a goroutine launch in the original source
///
/// For a named target, `open` is where the target expression starts and
/// `close` is right after the call's closing parenthesis. For an inline
/// literal, `open` is right after the body's `{` and `close` is the `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoAnchor {
    pub open: Anchor,
    pub close: Anchor,
}

/// One `import` of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit package name (`fp`, `_`, `.`)
    pub alias: Option<String>,
    /// Import path without quotes
    pub path: String,
}

impl ImportSpec {
    pub fn new(alias: Option<&str>, path: &str) -> Self {
        Self {
            alias: alias.map(str::to_string),
            path: path.trim_matches(|c| c == '"' || c == '`').to_string(),
        }
    }

    /// Name the file reaches the package by, if it can qualify identifiers
    ///
    /// Without an alias this is the last path element, which is the package
    /// name for every conventionally laid out module.
    pub fn local_name(&self) -> Option<&str> {
        match self.alias.as_deref() {
            Some("_" | ".") => None,
            Some(alias) => Some(alias),
            None => self.path.rsplit('/').next().filter(|name| !name.is_empty()),
        }
    }
}

/// Kind-specific part of a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// Root of a file
    Package {
        name: String,
        imports: Vec<ImportSpec>,
        /// Line of the first top-level declaration after the package clause
        import_anchor_line: Option<usize>,
    },
    Function {
        has_result: bool,
    },
    IfElse,
    Case,
    For,
    GoRoutine {
        /// Launched function expression, empty for an inline literal
        target: String,
        anchor: Option<GoAnchor>,
    },
}

impl FrameKind {
    /// Short name used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            FrameKind::Package { .. } => "package",
            FrameKind::Function { .. } => "func",
            FrameKind::IfElse => "if",
            FrameKind::Case => "case",
            FrameKind::For => "for",
            FrameKind::GoRoutine { .. } => "go",
        }
    }

    /// Whether generating this frame opens a goroutine-id scope
    pub fn opens_scope(&self) -> bool {
        matches!(self, FrameKind::Function { .. } | FrameKind::GoRoutine { .. })
    }
}

/// One instrumentable block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    path: String,
    /// Line of the first token of the construct
    pub head_line: usize,
    /// Line of the opening `{` (or the `case` keyword)
    pub body_begin_line: usize,
    /// Line of the closing `}`, or of the `return` that ends the block early
    pub body_end_line: usize,
    /// Line of the closing `}` even when a `return` lowered `body_end_line`
    pub block_end_line: usize,
    pub is_return: bool,
    pub is_unreachable: bool,
    /// Right after the body's `{`
    pub open_anchor: Option<Anchor>,
    /// Where the block ends: the closing `}`, the next clause of a switch,
    /// or a jump that ends a clause
    pub close_anchor: Option<Anchor>,
    pub children: Vec<FrameId>,
}

impl Frame {
    pub(crate) fn new(kind: FrameKind, path: String, head_line: usize, body_begin_line: usize) -> Self {
        Self {
            kind,
            path,
            head_line,
            body_begin_line,
            body_end_line: body_begin_line,
            block_end_line: body_begin_line,
            is_return: false,
            is_unreachable: false,
            open_anchor: None,
            close_anchor: None,
            children: Vec::with_capacity(8),
        }
    }

    /// Unique hierarchical name of the frame within its file
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Single-line block with nothing to wrap
    pub fn is_degenerate(&self) -> bool {
        self.body_begin_line == self.body_end_line
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{{{}:{}}}{}",
            self.path, self.head_line, self.body_begin_line, self.body_end_line, self.block_end_line
        )?;
        if self.is_return {
            write!(f, " [return]")?;
        }
        if self.is_unreachable {
            write!(f, " [unreachable]")?;
        }
        match &self.kind {
            FrameKind::Function { has_result: true } => write!(f, " [result]"),
            FrameKind::GoRoutine { target, .. } if !target.is_empty() => write!(f, " [go {target}]"),
            _ => Ok(()),
        }
    }
}

/// Traversal order for [`FrameTree::visit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOrder {
    PreOrder,
    PostOrder,
}

/// Finished, read-only frame tree of one file
#[derive(Debug, Clone)]
pub struct FrameTree {
    frames: Vec<Frame>,
}

impl FrameTree {
    pub(crate) fn from_arena(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn root(&self) -> &Frame {
        &self.frames[FrameId::ROOT.index()]
    }

    /// Look up a frame (ids come from this tree, so they are always in range)
    pub fn get(&self, id: FrameId) -> &Frame {
        &self.frames[id.index()]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn package_name(&self) -> &str {
        match &self.root().kind {
            FrameKind::Package { name, .. } => name,
            _ => "",
        }
    }

    pub fn imports(&self) -> &[ImportSpec] {
        match &self.root().kind {
            FrameKind::Package { imports, .. } => imports,
            _ => &[],
        }
    }

    pub fn import_anchor_line(&self) -> Option<usize> {
        match &self.root().kind {
            FrameKind::Package { import_anchor_line, .. } => *import_anchor_line,
            _ => None,
        }
    }

    /// Visit every frame starting at the root
    pub fn visit<F>(&self, order: VisitOrder, mut callback: F)
    where
        F: FnMut(FrameId, &Frame),
    {
        self.visit_from(FrameId::ROOT, order, &mut callback);
    }

    fn visit_from<F>(&self, id: FrameId, order: VisitOrder, callback: &mut F)
    where
        F: FnMut(FrameId, &Frame),
    {
        let frame = self.get(id);
        if order == VisitOrder::PreOrder {
            callback(id, frame);
        }
        for &child in &frame.children {
            self.visit_from(child, order, callback);
        }
        if order == VisitOrder::PostOrder {
            callback(id, frame);
        }
    }

    /// Frame ids in the given order
    pub fn ids(&self, order: VisitOrder) -> Vec<FrameId> {
        let mut ids = Vec::with_capacity(self.frames.len());
        self.visit(order, |id, _| ids.push(id));
        ids
    }

    /// Log the whole tree at debug level
    pub fn dump(&self, order: VisitOrder) {
        log::debug!("================ frames ({order:?}) ================");
        self.visit(order, |_, frame| log::debug!("{} {frame}", frame.kind.label()));
        log::debug!("====================================================");
    }
}
