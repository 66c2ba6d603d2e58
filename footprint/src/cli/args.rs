//! CLI argument definitions

use clap::{ArgGroup, Parser};
use footprint_common::{DEFAULT_MAX_SCOPE_DEPTH, SDK_ALIAS, SDK_IMPORT_PATH};
use log::LevelFilter;
use std::path::PathBuf;

use crate::config::{EngineConfig, SdkConfig};
use crate::processor::{Mode, Output, ProcessOptions};

#[derive(Parser, Debug)]
#[command(
    name = "footprint",
    version,
    about = "Instrument Go sources with call-graph tracing probes",
    group(ArgGroup::new("target").required(true).args(["file", "dir", "package"])),
    after_help = "\
EXAMPLES:
    footprint --file main.go --print         Show the instrumented file
    footprint --dir ./cmd/server --stat      Instrument one directory
    footprint --package . -e vendor          Instrument a whole module
    footprint --package . --clean            Restore the original sources"
)]
pub struct Args {
    /// Source file to instrument
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Directory whose Go files are instrumented (not recursive)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Package directory, instrumented recursively (needs a go.mod)
    #[arg(long, value_name = "DIR")]
    pub package: Option<PathBuf>,

    /// Directory to skip, relative to the package root (package mode only)
    #[arg(short = 'e', long = "exclude", value_name = "DIR")]
    pub exclude: Vec<PathBuf>,

    /// Only parse files and collect statistics
    #[arg(long)]
    pub dry: bool,

    /// Write the result to stdout instead of a file (implies --no-rename)
    #[arg(long)]
    pub print: bool,

    /// Keep the source file in place after generating
    #[arg(long)]
    pub no_rename: bool,

    /// Show code structure statistics
    #[arg(long)]
    pub stat: bool,

    /// Delete generated files and move the sources back
    #[arg(long, conflicts_with_all = ["dry", "print"])]
    pub clean: bool,

    /// Export statistics as JSON
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Import path of the runtime support library
    #[arg(long, value_name = "PATH", default_value = SDK_IMPORT_PATH)]
    pub sdk_path: String,

    /// Package alias the generated code uses for the support library
    #[arg(long, value_name = "NAME", default_value = SDK_ALIAS)]
    pub sdk_alias: String,

    /// Maximum nesting of functions and goroutines per file
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_SCOPE_DEPTH)]
    pub max_depth: usize,

    /// Number of files processed in parallel
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub jobs: usize,

    /// Show debug log
    #[arg(short, long, conflicts_with = "silent")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long)]
    pub silent: bool,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.silent {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }

    /// Selected mode and its path; the argument group guarantees one is set
    pub fn target(&self) -> (Mode, PathBuf) {
        match (&self.file, &self.dir, &self.package) {
            (Some(file), _, _) => (Mode::File, file.clone()),
            (None, Some(dir), _) => (Mode::Dir, dir.clone()),
            (None, None, Some(package)) => (Mode::Package, package.clone()),
            (None, None, None) => (Mode::File, PathBuf::new()),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            sdk: SdkConfig {
                import_path: self.sdk_path.clone(),
                alias: self.sdk_alias.clone(),
            },
            max_scope_depth: self.max_depth,
        }
    }

    pub fn output(&self) -> Output {
        if self.dry {
            Output::Dry
        } else if self.print {
            Output::Stdout
        } else {
            Output::Files { rename: !self.no_rename }
        }
    }

    pub fn process_options(&self) -> ProcessOptions {
        let (mode, target) = self.target();
        ProcessOptions {
            mode,
            target,
            excludes: self.exclude.clone(),
            output: self.output(),
            jobs: self.jobs,
            engine: self.engine_config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_exactly_one_target() {
        assert!(Args::try_parse_from(["footprint"]).is_err());
        assert!(Args::try_parse_from(["footprint", "--file", "a.go", "--dir", "."]).is_err());
        assert!(Args::try_parse_from(["footprint", "--dir", "."]).is_ok());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["footprint", "--file", "main.go"]).unwrap();
        assert_eq!(args.target(), (Mode::File, PathBuf::from("main.go")));
        assert_eq!(args.output(), Output::Files { rename: true });
        assert_eq!(args.engine_config(), EngineConfig::default());
        assert_eq!(args.log_level(), LevelFilter::Info);
        assert_eq!(args.jobs, 1);
    }

    #[test]
    fn test_package_with_excludes() {
        let args =
            Args::try_parse_from(["footprint", "--package", "app", "-e", "vendor", "--exclude", "gen", "-j", "4"])
                .unwrap();
        let options = args.process_options();
        assert_eq!(options.mode, Mode::Package);
        assert_eq!(options.excludes, vec![PathBuf::from("vendor"), PathBuf::from("gen")]);
        assert_eq!(options.jobs, 4);
    }

    #[test]
    fn test_output_modes() {
        let dry = Args::try_parse_from(["footprint", "--file", "a.go", "--dry"]).unwrap();
        assert_eq!(dry.output(), Output::Dry);
        let print = Args::try_parse_from(["footprint", "--file", "a.go", "--print"]).unwrap();
        assert_eq!(print.output(), Output::Stdout);
        let keep = Args::try_parse_from(["footprint", "--file", "a.go", "--no-rename"]).unwrap();
        assert_eq!(keep.output(), Output::Files { rename: false });
    }

    #[test]
    fn test_log_levels() {
        let verbose = Args::try_parse_from(["footprint", "--file", "a.go", "-v"]).unwrap();
        assert_eq!(verbose.log_level(), LevelFilter::Debug);
        let silent = Args::try_parse_from(["footprint", "--file", "a.go", "-s"]).unwrap();
        assert_eq!(silent.log_level(), LevelFilter::Warn);
        assert!(Args::try_parse_from(["footprint", "--file", "a.go", "-v", "-s"]).is_err());
    }
}
