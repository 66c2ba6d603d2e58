//! Per-kind code generation
//!
//! `on_enter` runs on the line of a frame's `body_begin_line`, `on_exit` on
//! its `body_end_line`, `on_finalize` once after the last line. Scope
//! bookkeeping in `on_exit` always happens; `emit_trace` only controls
//! whether the block-reached recording is written (it is `false` for frames
//! whose end is unreachable).

use log::warn;

use super::env::GenerationEnvironment;
use crate::domain::{FrameId, InstrumentError};
use crate::frame::{Frame, FrameKind, GoAnchor};
use crate::rewrite::LineBuf;

const WRAPPER_OPEN: &str = "func(){";
const WRAPPER_CLOSE: &str = "}()";

pub fn on_enter(
    id: FrameId,
    frame: &Frame,
    env: &mut GenerationEnvironment,
    line: &mut LineBuf,
) -> Result<(), InstrumentError> {
    match &frame.kind {
        FrameKind::Package { .. } | FrameKind::IfElse | FrameKind::Case | FrameKind::For => Ok(()),
        FrameKind::Function { .. } => {
            env.push_scope()?;
            let point = env.allocate_call_point(id);
            let gid = env.current_scope()?.to_string();
            let call = env.gen_call(&gid, &point);
            match frame.open_anchor {
                Some(a) if a.line == line.line_no() => line.insert_at(a.column, &call),
                _ => line.append(&call),
            }
            Ok(())
        }
        FrameKind::GoRoutine { target, anchor } if !target.is_empty() => {
            env.push_scope()?;
            let open = format!("{WRAPPER_OPEN}{}", env.gen_bind()?);
            let opened = match anchor {
                Some(a) if a.open.line == line.line_no() => {
                    line.insert_at(a.open.column, &open);
                    true
                }
                _ => line.insert_before_first(target, &open),
            };
            if !opened {
                warn!("cannot find `{target}` on line {}, skip `{}`", line.line_no(), frame.path());
                return Ok(());
            }
            env.mark_wrapped(id);
            if frame.is_degenerate() {
                close_wrapper(anchor.as_ref(), line);
            }
            Ok(())
        }
        FrameKind::GoRoutine { anchor, .. } => {
            env.push_scope()?;
            let mut text = env.gen_bind()?;
            let point = env.allocate_call_point(id);
            let gid = env.current_scope()?.to_string();
            text.push_str(&env.gen_call(&gid, &point));
            match anchor {
                Some(a) if a.open.line == line.line_no() => line.insert_at(a.open.column, &text),
                _ => line.append(&text),
            }
            Ok(())
        }
    }
}

pub fn on_exit(
    id: FrameId,
    frame: &Frame,
    env: &mut GenerationEnvironment,
    line: &mut LineBuf,
    emit_trace: bool,
) -> Result<(), InstrumentError> {
    match &frame.kind {
        FrameKind::Package { .. } => Ok(()),
        FrameKind::IfElse | FrameKind::Case | FrameKind::For => {
            if emit_trace {
                let point = env.allocate_end_point(id);
                place_collect(frame, line, &env.gen_collect(&point)?);
            }
            Ok(())
        }
        FrameKind::Function { has_result } => {
            // a function with results that does not end in `return` cannot
            // fall through its closing brace
            if emit_trace && !(*has_result && !frame.is_return) {
                let point = env.allocate_end_point(id);
                place_collect(frame, line, &env.gen_collect(&point)?);
            }
            env.pop_scope();
            Ok(())
        }
        FrameKind::GoRoutine { target, anchor } if !target.is_empty() => {
            let wrapped = env.frame_points(id).is_some_and(|p| p.wrapped);
            if wrapped && !frame.is_degenerate() {
                close_wrapper(anchor.as_ref(), line);
            }
            env.pop_scope();
            Ok(())
        }
        FrameKind::GoRoutine { anchor, .. } => {
            if emit_trace {
                let point = env.allocate_end_point(id);
                let collect = env.gen_collect(&point)?;
                match anchor {
                    Some(a) if !frame.is_return && a.close.line == line.line_no() => {
                        line.insert_at(a.close.column, &collect);
                    }
                    _ => line.prepend(&collect),
                }
            }
            env.pop_scope();
            Ok(())
        }
    }
}

/// Registration statements for the points `id` allocated
pub fn on_finalize(id: FrameId, frame: &Frame, env: &GenerationEnvironment) -> String {
    if let FrameKind::Package { .. } = frame.kind {
        return env.gen_file_registration();
    }
    let Some(points) = env.frame_points(id) else {
        return String::new();
    };
    [&points.call, &points.end]
        .into_iter()
        .flatten()
        .map(|point| env.gen_point(point, frame.path()))
        .collect()
}

/// In front of the block end, or of the `return` that ends the block early
fn place_collect(frame: &Frame, line: &mut LineBuf, collect: &str) {
    match frame.close_anchor {
        Some(a) if !frame.is_return && a.line == line.line_no() => line.insert_at(a.column, collect),
        _ => line.prepend(collect),
    }
}

fn close_wrapper(anchor: Option<&GoAnchor>, line: &mut LineBuf) {
    match anchor {
        Some(a) if a.close.line == line.line_no() => line.insert_at(a.close.column, WRAPPER_CLOSE),
        _ => line.append(WRAPPER_CLOSE),
    }
}
