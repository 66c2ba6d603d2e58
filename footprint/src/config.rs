//! Engine configuration
//!
//! Built from the command line in `main.rs`, defaults match the Go support
//! library shipped alongside the tool.

use footprint_common::{DEFAULT_MAX_SCOPE_DEPTH, SDK_ALIAS, SDK_IMPORT_PATH};

/// Where generated code finds the runtime support library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkConfig {
    pub import_path: String,
    pub alias: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            import_path: SDK_IMPORT_PATH.to_string(),
            alias: SDK_ALIAS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub sdk: SdkConfig,
    /// Capacity of the generation-time scope stack
    pub max_scope_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sdk: SdkConfig::default(),
            max_scope_depth: DEFAULT_MAX_SCOPE_DEPTH,
        }
    }
}
