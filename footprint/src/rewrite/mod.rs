//! Line-indexed rewriting of a source file
//!
//! [`HookTable::prepare`] walks a finished frame tree once and records, per
//! line, which frames start or end there. Hooks are registered in nesting
//! order (a frame's `Enter` on the way down, its `Exit` on the way up), so
//! on a line shared by several frames inner blocks are closed before the
//! blocks around them.
//!
//! [`rewrite`] then streams the original lines through the table and
//! appends one trailing block with every registration statement.

pub mod line;

use std::collections::BTreeMap;

use log::{debug, warn};

pub use line::LineBuf;

use crate::codegen::{on_enter, on_exit, on_finalize, GenerationEnvironment};
use crate::domain::{FrameId, InstrumentError};
use crate::frame::{FrameKind, FrameTree, VisitOrder};

/// What happens to a frame on a given line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// The frame's body begins
    Enter(FrameId),
    /// The frame's body ends and its end is reachable
    Exit(FrameId),
    /// The frame's body ends but its end is unreachable: close its scope only
    Close(FrameId),
}

#[derive(Debug, Default)]
pub struct HookTable {
    lines: BTreeMap<usize, Vec<Hook>>,
}

impl HookTable {
    pub fn prepare(tree: &FrameTree) -> Self {
        let mut table = Self::default();
        for &child in &tree.root().children {
            table.register(tree, child, false);
        }
        table
    }

    /// `scoped` tells whether the code around `id` runs inside a generated
    /// goroutine-id scope
    fn register(&mut self, tree: &FrameTree, id: FrameId, scoped: bool) {
        let frame = tree.get(id);

        let registered = match frame.kind {
            FrameKind::GoRoutine { .. } => scoped,
            FrameKind::Function { .. } => !frame.is_degenerate(),
            _ => scoped && !frame.is_degenerate(),
        };

        if registered {
            self.push(frame.body_begin_line, Hook::Enter(id));
        } else if frame.is_degenerate() {
            warn!("Skip single-line block `{}` at line {}", frame.path(), frame.head_line);
        } else {
            debug!("Skip `{}`, no enclosing scope", frame.path());
        }

        let inner_scoped = if frame.kind.opens_scope() { registered } else { scoped };
        for &child in &frame.children {
            self.register(tree, child, inner_scoped);
        }

        if registered {
            let hook = if frame.is_unreachable { Hook::Close(id) } else { Hook::Exit(id) };
            self.push(frame.body_end_line, hook);
        }
    }

    fn push(&mut self, line: usize, hook: Hook) {
        self.lines.entry(line).or_default().push(hook);
    }

    /// Hooks registered on a 1-based line, in application order
    pub fn hooks_at(&self, line: usize) -> &[Hook] {
        self.lines.get(&line).map_or(&[], Vec::as_slice)
    }

    /// Number of hooks in the table
    pub fn len(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Reject sources whose line terminators are not plain `\n`
pub fn check_line_terminators(source: &str) -> Result<(), InstrumentError> {
    if source.contains('\r') {
        return Err(InstrumentError::MixedLineTerminators);
    }
    Ok(())
}

/// Produce the instrumented text of one file
pub fn rewrite(
    source: &str,
    tree: &FrameTree,
    hooks: &HookTable,
    env: &mut GenerationEnvironment,
) -> Result<String, InstrumentError> {
    check_line_terminators(source)?;

    let mut lines: Vec<&str> = source.split('\n').collect();
    if source.ends_with('\n') {
        lines.pop();
    }

    let import = match imported_as(tree, env.import_path()) {
        Some(alias) => {
            debug!("support library already imported as `{alias}`");
            env.use_alias(&alias);
            None
        }
        None => Some(env.gen_import()),
    };
    let import_line = import.as_ref().and(tree.import_anchor_line());

    let mut output = String::with_capacity(source.len() + source.len() / 2);
    for (index, original) in lines.iter().enumerate() {
        let line_no = index + 1;
        let mut line = LineBuf::new(line_no, original);

        if Some(line_no) == import_line {
            if let Some(import) = &import {
                line.prepend(import);
            }
        }

        for hook in hooks.hooks_at(line_no) {
            match *hook {
                Hook::Enter(id) => on_enter(id, tree.get(id), env, &mut line)?,
                Hook::Exit(id) => on_exit(id, tree.get(id), env, &mut line, true)?,
                Hook::Close(id) => on_exit(id, tree.get(id), env, &mut line, false)?,
            }
        }

        output.push_str(line.as_str());
        output.push('\n');
    }

    if env.depth() != 0 {
        warn!("{} scopes still open after the last line", env.depth());
    }

    // no declaration to anchor on: the import opens the trailing block
    if import_line.is_none() {
        if let Some(import) = &import {
            output.push_str(import);
            output.push('\n');
        }
    }

    tree.visit(VisitOrder::PreOrder, |id, frame| {
        output.push_str(&on_finalize(id, frame, env));
    });

    Ok(output)
}

/// Name under which the file already imports `import_path`, if usable
fn imported_as(tree: &FrameTree, import_path: &str) -> Option<String> {
    tree.imports()
        .iter()
        .filter(|spec| spec.path == import_path)
        .find_map(|spec| spec.local_name().map(str::to_string))
}
