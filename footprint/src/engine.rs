//! Single-file pipeline
//!
//! ```text
//! source ─► line terminator check ─► front end ─► FrameTree
//!                                                   │
//!                     ┌─────────────────────────────┼──────────────┐
//!                     ▼                             ▼              ▼
//!               HookTable::prepare           Stats::from_tree   dump (debug)
//!                     │
//!                     ▼
//!            rewrite(GenerationEnvironment) ─► instrumented text
//! ```
//!
//! Everything here works on in-memory text; writing artifacts is the
//! processor's job.

use log::debug;

use crate::analysis::Stats;
use crate::codegen::GenerationEnvironment;
use crate::config::EngineConfig;
use crate::domain::InstrumentError;
use crate::frame::{FrameTree, VisitOrder};
use crate::frontend;
use crate::rewrite::{check_line_terminators, rewrite, HookTable};

/// Result of instrumenting one file
#[derive(Debug)]
pub struct Instrumented {
    pub output: String,
    pub tree: FrameTree,
    pub stats: Stats,
}

/// Parse and count without generating code
pub fn analyze_source(source: &str) -> Result<(FrameTree, Stats), InstrumentError> {
    check_line_terminators(source)?;
    let tree = frontend::parse(source)?;
    tree.dump(VisitOrder::PostOrder);
    let stats = Stats::from_tree(&tree, frontend::line_count(source));
    Ok((tree, stats))
}

/// Instrument one file held in memory
///
/// `filename` is what the generated code registers the file as; it also
/// seeds the identifier prefix, so the same name always yields the same
/// output.
pub fn instrument_source(
    filename: &str,
    source: &str,
    config: &EngineConfig,
) -> Result<Instrumented, InstrumentError> {
    let (tree, stats) = analyze_source(source)?;

    let hooks = HookTable::prepare(&tree);
    debug!("{} hooks on {} frames", hooks.len(), tree.len());

    let mut env = GenerationEnvironment::new(filename, config);
    let output = rewrite(source, &tree, &hooks, &mut env)?;

    Ok(Instrumented { output, tree, stats })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOROUTINES: &str = "package main\n\nfunc main() {\n\tgo worker(1)\n\tgo func() { y() }()\n}\n";

    #[test]
    fn test_named_and_inline_goroutines() {
        let result = instrument_source("main.go", GOROUTINES, &EngineConfig::default()).unwrap();
        let env = GenerationEnvironment::new("main.go", &EngineConfig::default());
        let p = env.prefix();
        let lines: Vec<&str> = result.output.lines().collect();

        assert_eq!(lines[3], format!("\tgo func(){{sdk.Bind({p}_g1);worker(1)}}()"));
        assert_eq!(
            lines[4],
            format!(
                "\tgo func() {{sdk.Bind({p}_g1);var {p}_g3 = sdk.Call({p}_e2);_ = {p}_g3; y() sdk.C({p}_g3, {p}_e3);}}()"
            )
        );
        assert_eq!(result.stats.go_func_count, 2);
        assert_eq!(result.output.matches("sdk.NewE(").count(), 4);
    }

    #[test]
    fn test_output_keeps_line_count() {
        let result = instrument_source("main.go", GOROUTINES, &EngineConfig::default()).unwrap();
        let (trailing, body): (Vec<&str>, Vec<&str>) = result
            .output
            .lines()
            .partition(|line| line.starts_with("const ") || line.starts_with("var _"));
        assert_eq!(body.len(), GOROUTINES.lines().count());
        assert!(!trailing.is_empty());
    }

    #[test]
    fn test_same_input_same_output() {
        let config = EngineConfig::default();
        let a = instrument_source("/src/main.go", GOROUTINES, &config).unwrap();
        let b = instrument_source("/src/main.go", GOROUTINES, &config).unwrap();
        assert_eq!(a.output, b.output);
    }

    #[test]
    fn test_carriage_return_rejected_before_parsing() {
        let result = instrument_source("main.go", "package main\r\n", &EngineConfig::default());
        assert!(matches!(result, Err(InstrumentError::MixedLineTerminators)));
    }

    #[test]
    fn test_custom_sdk_alias() {
        let mut config = EngineConfig::default();
        config.sdk.alias = "fp".to_string();
        config.sdk.import_path = "example.com/fp".to_string();
        let result = instrument_source("main.go", GOROUTINES, &config).unwrap();
        assert!(result.output.contains("import fp \"example.com/fp\";func main()"));
        assert!(result.output.contains("fp.Bind("));
        assert!(!result.output.contains("sdk."));
    }

    fn prefix() -> String {
        GenerationEnvironment::new("main.go", &EngineConfig::default()).prefix().to_string()
    }

    #[test]
    fn test_named_goroutine_wraps_multiline_literal_argument() {
        let source = "package main\n\nfunc main() {\n\tgo run(func() {\n\t\tx()\n\t})\n}\n";
        let result = instrument_source("main.go", source, &EngineConfig::default()).unwrap();
        let p = prefix();
        let lines: Vec<&str> = result.output.lines().collect();

        assert_eq!(
            lines[3],
            format!("\tgo func(){{sdk.Bind({p}_g1);run(func() {{var {p}_g3 = sdk.Call({p}_e2);_ = {p}_g3;")
        );
        assert_eq!(lines[5], format!("\tsdk.C({p}_g3, {p}_e3);}})}}()"));
        assert_eq!(lines[6], format!("sdk.C({p}_g1, {p}_e4);}}"));
        // the launch itself declares no variable of its own
        assert!(!result.output.contains(&format!("{p}_g2")));
    }

    #[test]
    fn test_case_collect_after_multiline_statement() {
        let source = "package main\n\nfunc f(x int) {\n\tswitch x {\n\tcase 1:\n\t\tlog(\"a\",\n\t\t\tx)\n\tdefault:\n\t}\n}\n";
        let result = instrument_source("main.go", source, &EngineConfig::default()).unwrap();
        let p = prefix();
        let lines: Vec<&str> = result.output.lines().collect();

        assert_eq!(lines[5], "\t\tlog(\"a\",");
        assert_eq!(lines[6], "\t\t\tx)");
        assert_eq!(lines[7], format!("\tsdk.C({p}_g1, {p}_e2);default:"));
        assert_eq!(lines[8], format!("\tsdk.C({p}_g1, {p}_e3);}}"));
    }

    #[test]
    fn test_function_entry_before_trailing_comment() {
        let source = "package main\n\nfunc f() { // entry\n\tx()\n}\n";
        let result = instrument_source("main.go", source, &EngineConfig::default()).unwrap();
        let p = prefix();

        assert_eq!(
            result.output.lines().nth(2).unwrap(),
            format!(
                "import sdk \"github.com/Unixeno/gootprint/sdk\";func f() {{var {p}_g1 = sdk.Call({p}_e1);_ = {p}_g1; // entry"
            )
        );
    }

    #[test]
    fn test_existing_import_alias_is_used() {
        let source = "package main\n\nimport fp \"github.com/Unixeno/gootprint/sdk\"\n\nfunc main() {\n\tx()\n}\n";
        let result = instrument_source("main.go", source, &EngineConfig::default()).unwrap();

        assert_eq!(result.output.matches("import ").count(), 1);
        assert!(result.output.contains("fp.Call("));
        assert!(result.output.contains("fp.C("));
        assert!(result.output.contains("fp.NewE("));
        assert!(!result.output.contains("sdk.Call("));
    }

    #[test]
    fn test_nesting_beyond_scope_limit_fails() {
        let source = "package main\n\nfunc main() {\n\tf := func() {\n\t\tx()\n\t}\n\tf()\n}\n";
        let config = EngineConfig { max_scope_depth: 1, ..EngineConfig::default() };

        let result = instrument_source("main.go", source, &config);
        assert!(matches!(result, Err(InstrumentError::ScopeOverflow { capacity: 1 })));
        assert!(instrument_source("main.go", source, &EngineConfig::default()).is_ok());
    }
}
