use std::fs;
use std::path::{Path, PathBuf};

use footprint::config::EngineConfig;
use footprint::domain::ProcessError;
use footprint::processor::artifact::{artifact_path, backup_path};
use footprint::processor::{Mode, Output, ProcessOptions, Processor};

const MAIN: &str = "package main\n\nfunc main() {\n\tgo worker(1)\n}\n\nfunc worker(n int) {\n\tif n > 0 {\n\t\tprintln(n)\n\t}\n}\n";
const UTIL: &str = "package util\n\nfunc Sum(xs []int) int {\n\ttotal := 0\n\tfor _, x := range xs {\n\t\ttotal += x\n\t}\n\treturn total\n}\n";

fn options(mode: Mode, target: &Path, output: Output) -> ProcessOptions {
    ProcessOptions {
        mode,
        target: target.to_path_buf(),
        excludes: Vec::new(),
        output,
        jobs: 1,
        engine: EngineConfig::default(),
    }
}

/// go.mod at the root, sources at the root and in `util/` and `vendor/x/`
fn module_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::write(root.join("go.mod"), "module example.com/app\n\ngo 1.22\n").unwrap();
    fs::write(root.join("main.go"), MAIN).unwrap();
    fs::write(root.join("main_test.go"), "package main\n").unwrap();
    fs::create_dir_all(root.join("util")).unwrap();
    fs::write(root.join("util/sum.go"), UTIL).unwrap();
    fs::create_dir_all(root.join("vendor/x")).unwrap();
    fs::write(root.join("vendor/x/x.go"), "package x\n").unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join(".git/hook.go"), "package hook\n").unwrap();
    dir
}

fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
    files
        .iter()
        .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

#[test]
fn test_package_mode_discovers_and_excludes() {
    let dir = module_tree();
    let mut opts = options(Mode::Package, dir.path(), Output::Dry);
    opts.excludes = vec![PathBuf::from("vendor")];
    let processor = Processor::new(opts).expect("processor");

    assert_eq!(processor.module().map(|m| m.path.as_str()), Some("example.com/app"));
    let files = processor.collect_files().unwrap();
    assert_eq!(names(&files, dir.path()), ["main.go", "util/sum.go"]);
}

#[test]
fn test_dir_mode_is_not_recursive() {
    let dir = module_tree();
    let processor = Processor::new(options(Mode::Dir, dir.path(), Output::Dry)).expect("processor");
    let files = processor.collect_files().unwrap();
    assert_eq!(names(&files, dir.path()), ["main.go"]);
}

#[test]
fn test_instrument_then_clean_restores_sources() {
    let dir = module_tree();
    let root = dir.path();
    let main = root.join("main.go");
    let sum = root.join("util/sum.go");

    let processor =
        Processor::new(options(Mode::Package, root, Output::Files { rename: true })).expect("processor");
    let outcomes = processor.run().expect("run");
    assert_eq!(outcomes.len(), 3);

    assert!(!main.exists());
    assert_eq!(fs::read_to_string(backup_path(&main)).unwrap(), MAIN);
    let generated = fs::read_to_string(artifact_path(&main)).unwrap();
    assert!(generated.contains("sdk.Bind("));
    assert!(artifact_path(&sum).is_file());

    let report = processor.clean().expect("clean");
    assert_eq!(report.removed, 3);
    assert_eq!(report.restored, 3);
    assert_eq!(fs::read_to_string(&main).unwrap(), MAIN);
    assert_eq!(fs::read_to_string(&sum).unwrap(), UTIL);
    assert!(!artifact_path(&main).exists());
    assert!(!backup_path(&sum).exists());
}

#[test]
fn test_no_rename_keeps_source() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.go");
    fs::write(&file, MAIN).unwrap();

    let processor =
        Processor::new(options(Mode::File, &file, Output::Files { rename: false })).expect("processor");
    processor.run().expect("run");

    assert_eq!(fs::read_to_string(&file).unwrap(), MAIN);
    assert!(artifact_path(&file).is_file());
    assert!(!backup_path(&file).exists());
}

#[test]
fn test_carriage_returns_leave_no_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("win.go");
    let source = "package main\r\n\r\nfunc main() {\r\n}\r\n";
    fs::write(&file, source).unwrap();

    let processor =
        Processor::new(options(Mode::File, &file, Output::Files { rename: true })).expect("processor");
    let err = processor.run().unwrap_err();

    assert!(matches!(err, ProcessError::Instrument { .. }));
    assert!(!artifact_path(&file).exists());
    assert!(!backup_path(&file).exists());
    assert_eq!(fs::read_to_string(&file).unwrap(), source);
}

#[test]
fn test_parallel_results_follow_file_order() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..12 {
        let body = "\tif true {\n\t\tprintln()\n\t}\n".repeat(i + 1);
        fs::write(dir.path().join(format!("f{i:02}.go")), format!("package p\n\nfunc f() {{\n{body}}}\n")).unwrap();
    }

    let mut opts = options(Mode::Dir, dir.path(), Output::Dry);
    opts.jobs = 4;
    let outcomes = Processor::new(opts).expect("processor").run().expect("run");

    assert_eq!(outcomes.len(), 12);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert!(outcome.file.ends_with(format!("f{i:02}.go")));
        assert_eq!(outcome.stats.if_count, i + 1);
    }
}

#[test]
fn test_parallel_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.go"), "package p\n").unwrap();
    fs::write(dir.path().join("b.go"), "package p\n\nfunc broken( {\n").unwrap();
    fs::write(dir.path().join("c.go"), "package p\n").unwrap();

    let mut opts = options(Mode::Dir, dir.path(), Output::Dry);
    opts.jobs = 3;
    let err = Processor::new(opts).expect("processor").run().unwrap_err();

    match err {
        ProcessError::Instrument { file, .. } => assert!(file.ends_with("b.go")),
        other => panic!("unexpected error {other:?}"),
    }
}
