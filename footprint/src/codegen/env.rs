//! Generation environment
//!
//! Per-file naming state and the goroutine-lineage stack used while hooks
//! run. A scope is pushed when a function or goroutine frame starts
//! generating and popped when it ends; the top entry names the variable
//! holding the id of the goroutine that runs the code being generated.
//!
//! Nothing here happens at the instrumented program's runtime: the stack only
//! decides which identifiers the emitted text references.

use std::collections::HashMap;

use footprint_common::{
    FILE_CONST_SUFFIX, FN_BIND, FN_CALL, FN_COLLECT, FN_NEW_POINT, FN_REGISTER_FILE,
    GOID_VAR_INFIX, POINT_VAR_INFIX,
};

use super::naming::{file_prefix, go_string_literal};
use crate::config::EngineConfig;
use crate::domain::{FrameId, InstrumentError};

/// Point names a frame allocated during the rewrite pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FramePoints {
    /// Captured at entry (functions, inline goroutines)
    pub call: Option<String>,
    /// Recorded at the block end
    pub end: Option<String>,
    /// A named goroutine launch was opened as `func(){...` and needs `}()`
    pub wrapped: bool,
}

/// Naming state and scope stack for one file
#[derive(Debug)]
pub struct GenerationEnvironment {
    filename: String,
    prefix: String,
    file_const: String,
    alias: String,
    import_path: String,

    point_index: usize,
    scope_index: usize,

    scopes: Vec<String>,
    capacity: usize,

    points: HashMap<FrameId, FramePoints>,
}

impl GenerationEnvironment {
    pub fn new(filename: &str, config: &EngineConfig) -> Self {
        let prefix = file_prefix(filename);
        Self {
            filename: filename.to_string(),
            file_const: format!("{prefix}{FILE_CONST_SUFFIX}"),
            prefix,
            alias: config.sdk.alias.clone(),
            import_path: config.sdk.import_path.clone(),
            point_index: 0,
            scope_index: 0,
            scopes: Vec::with_capacity(16),
            capacity: config.max_scope_depth,
            points: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn import_path(&self) -> &str {
        &self.import_path
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Qualify generated calls with the name an existing import already gives the library
    pub fn use_alias(&mut self, alias: &str) {
        self.alias = alias.to_string();
    }

    // ---------- names ----------

    pub fn allocate_point_name(&mut self) -> String {
        self.point_index += 1;
        format!("{}{POINT_VAR_INFIX}{}", self.prefix, self.point_index)
    }

    pub fn allocate_scope_name(&mut self) -> String {
        self.scope_index += 1;
        format!("{}{GOID_VAR_INFIX}{}", self.prefix, self.scope_index)
    }

    /// Allocate the entry point of `frame`
    pub fn allocate_call_point(&mut self, frame: FrameId) -> String {
        let name = self.allocate_point_name();
        self.points.entry(frame).or_default().call = Some(name.clone());
        name
    }

    /// Allocate the block-end point of `frame`
    pub fn allocate_end_point(&mut self, frame: FrameId) -> String {
        let name = self.allocate_point_name();
        self.points.entry(frame).or_default().end = Some(name.clone());
        name
    }

    pub fn mark_wrapped(&mut self, frame: FrameId) {
        self.points.entry(frame).or_default().wrapped = true;
    }

    pub fn frame_points(&self, frame: FrameId) -> Option<&FramePoints> {
        self.points.get(&frame)
    }

    // ---------- scope stack ----------

    /// Open a scope with a fresh goroutine-id variable
    pub fn push_scope(&mut self) -> Result<&str, InstrumentError> {
        if self.scopes.len() >= self.capacity {
            return Err(InstrumentError::ScopeOverflow { capacity: self.capacity });
        }
        let name = self.allocate_scope_name();
        self.scopes.push(name);
        Ok(self.scopes.last().map_or("", String::as_str))
    }

    /// Close the innermost scope; closing with nothing open is a no-op
    pub fn pop_scope(&mut self) -> Option<String> {
        self.scopes.pop()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Goroutine-id variable of the innermost scope
    pub fn current_scope(&self) -> Result<&str, InstrumentError> {
        self.scope_at(1)
    }

    /// Goroutine-id variable of the scope that launched the innermost one
    pub fn parent_scope(&self) -> Result<&str, InstrumentError> {
        self.scope_at(2)
    }

    fn scope_at(&self, from_top: usize) -> Result<&str, InstrumentError> {
        let depth = self.scopes.len();
        if depth < from_top {
            return Err(InstrumentError::ScopeUnderflow { needed: from_top, depth });
        }
        Ok(&self.scopes[depth - from_top])
    }

    // ---------- statements ----------

    fn sdk_call(&self, method: &str, args: &str) -> String {
        format!("{}.{method}({args})", self.alias)
    }

    /// `var <point> = sdk.NewE(<file const>, "<path>")`
    pub fn gen_point(&self, point: &str, path: &str) -> String {
        let call = self.sdk_call(FN_NEW_POINT, &format!("{}, {}", self.file_const, go_string_literal(path)));
        format!("var {point} = {call}\n")
    }

    /// `var <gid> = sdk.Call(<point>);_ = <gid>;`
    pub fn gen_call(&self, gid: &str, point: &str) -> String {
        format!("var {gid} = {};_ = {gid};", self.sdk_call(FN_CALL, point))
    }

    /// `sdk.C(<current gid>, <point>);`
    pub fn gen_collect(&self, point: &str) -> Result<String, InstrumentError> {
        let gid = self.current_scope()?;
        Ok(format!("{};", self.sdk_call(FN_COLLECT, &format!("{gid}, {point}"))))
    }

    /// `sdk.Bind(<parent gid>);`
    pub fn gen_bind(&self) -> Result<String, InstrumentError> {
        let parent = self.parent_scope()?;
        Ok(format!("{};", self.sdk_call(FN_BIND, parent)))
    }

    /// File name constant and its registration
    pub fn gen_file_registration(&self) -> String {
        format!(
            "const {} = {}\nvar _ = {}\n",
            self.file_const,
            go_string_literal(&self.filename),
            self.sdk_call(FN_REGISTER_FILE, &self.file_const)
        )
    }

    /// `import sdk "<path>";`
    pub fn gen_import(&self) -> String {
        format!("import {} {};", self.alias, go_string_literal(&self.import_path))
    }
}
