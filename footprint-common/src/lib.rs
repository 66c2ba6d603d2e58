//! # Runtime Call Contract (generated Go ↔ support library)
//!
//! Defines the names shared between the code that `footprint` injects into a
//! Go program and the small Go support library that program links against.
//! Changing any of these breaks every previously instrumented tree, so they
//! live in their own crate and carry no logic.
//!
//! ## Primitives
//!
//! | Go function            | Returns  | Emitted by                              |
//! |------------------------|----------|-----------------------------------------|
//! | `RegisterFile(file)`   | `struct{}` | package frame, once per file          |
//! | `NewE(file, path)`     | point id | every allocated point, trailing block   |
//! | `Call(point)`          | goroutine id | function / inline goroutine entry   |
//! | `C(gid, point)`        | -        | block reached (if/for/case/func end)    |
//! | `Bind(parent_gid)`     | -        | goroutine launch, reads the new gid     |

#![no_std]

// ============================================================================
// Import
// ============================================================================

/// Import path of the Go support library.
pub const SDK_IMPORT_PATH: &str = "github.com/Unixeno/gootprint/sdk";

/// Package alias used to reach the support library from generated code.
pub const SDK_ALIAS: &str = "sdk";

// ============================================================================
// Primitives
// ============================================================================

/// Register the file constant once: `RegisterFile(file string) struct{}`
pub const FN_REGISTER_FILE: &str = "RegisterFile";

/// Register a trace point: `NewE(file, path string) uint16`
pub const FN_NEW_POINT: &str = "NewE";

/// Capture the running goroutine id under a point: `Call(point uint16) int64`
pub const FN_CALL: &str = "Call";

/// Record that a block end was reached: `C(gid int64, point uint16)`
pub const FN_COLLECT: &str = "C";

/// Link the freshly started goroutine to its parent: `Bind(parent int64)`
pub const FN_BIND: &str = "Bind";

// ============================================================================
// Generated identifiers
// ============================================================================

/// Suffix of the per-file constant holding the file name.
pub const FILE_CONST_SUFFIX: &str = "_fName";

/// Infix of point variables (`<prefix>_e<N>`).
pub const POINT_VAR_INFIX: &str = "_e";

/// Infix of goroutine id variables (`<prefix>_g<N>`).
pub const GOID_VAR_INFIX: &str = "_g";

/// Default bound of the generation-time scope stack.
///
/// Deeper nesting of functions/goroutine literals than this is rejected.
pub const DEFAULT_MAX_SCOPE_DEPTH: usize = 128;
