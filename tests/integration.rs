use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pipesh::{Config, Flow, Shell};

/// Fresh directory for one test; removed and recreated on each run.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pipesh-it-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn shell() -> Shell {
    Shell::new(&Config::default())
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ── Pipes ──

#[test]
fn pipeline_matches_system_shell() {
    let dir = scratch_dir("pipe-equivalence");
    let out = dir.join("out");
    let chain = "seq 3 | sort -r | tr 123 abc | head -n 2";

    let report = shell().run_line(&format!("{chain} > {}", out.display()));
    assert_eq!(report.status, 0);
    assert_eq!(report.spawned, 4);

    let expected = Command::new("sh").args(["-c", chain]).output().unwrap();
    assert_eq!(read(&out).as_bytes(), &expected.stdout[..]);
    assert_eq!(read(&out), "c\nb\n");
}

#[test]
fn pipeline_status_is_last_stage() {
    assert_eq!(shell().run_line("true | false").status, 1);
    assert_eq!(shell().run_line("false | true").status, 0);
}

#[test]
fn large_output_through_pipe_does_not_deadlock() {
    let dir = scratch_dir("large");
    let out = dir.join("count");
    let report = shell().run_line(&format!("seq 1 200000 | wc -l > {}", out.display()));
    assert_eq!(report.status, 0);
    assert_eq!(read(&out).trim(), "200000");
}

#[test]
fn explicit_redirection_beats_pipe() {
    let dir = scratch_dir("explicit");
    let middle = dir.join("middle");
    let out = dir.join("out");
    let report = shell().run_line(&format!(
        "echo first > {} | cat > {}",
        middle.display(),
        out.display()
    ));
    assert_eq!(report.status, 0);
    assert_eq!(read(&middle), "first\n");
    assert_eq!(read(&out), "");
}

#[test]
fn explicit_input_beats_pipe() {
    let dir = scratch_dir("explicit-input");
    let input = dir.join("in");
    let out = dir.join("out");
    fs::write(&input, "from file\n").unwrap();
    let report = shell().run_line(&format!(
        "echo from pipe | cat < {} > {}",
        input.display(),
        out.display()
    ));
    assert_eq!(report.status, 0);
    assert_eq!(read(&out), "from file\n");
}

// ── Sequencing ──

#[test]
fn and_skips_after_failure() {
    let dir = scratch_dir("and");
    let marker = dir.join("marker");
    let report = shell().run_line(&format!("false && touch {}", marker.display()));
    assert_eq!(report.status, 1);
    assert_eq!(report.spawned, 1);
    assert!(!marker.exists());
}

#[test]
fn and_runs_after_success() {
    let dir = scratch_dir("and-ok");
    let marker = dir.join("marker");
    shell().run_line(&format!("true && touch {}", marker.display()));
    assert!(marker.exists());
}

#[test]
fn semicolon_runs_after_failure() {
    let dir = scratch_dir("semicolon");
    let marker = dir.join("marker");
    let report = shell().run_line(&format!("false ; touch {}", marker.display()));
    assert_eq!(report.status, 0);
    assert!(marker.exists());
}

#[test]
fn failed_launch_short_circuits() {
    let dir = scratch_dir("launch");
    let marker = dir.join("marker");
    let report = shell().run_line(&format!(
        "pipesh-no-such-program && touch {}",
        marker.display()
    ));
    assert_eq!(report.status, 127);
    assert!(!marker.exists());
}

#[test]
fn operators_alone_do_nothing() {
    let mut shell = shell();
    for line in [";;", "&&", "; && ;"] {
        let report = shell.run_line(line);
        assert_eq!(report.flow, Flow::Continue);
        assert_eq!(report.status, 0, "line: {line}");
        assert_eq!(report.spawned, 0, "line: {line}");
    }
}

// ── Redirection ──

#[test]
fn truncate_and_append() {
    let dir = scratch_dir("truncate-append");
    let file = dir.join("file");

    fs::write(&file, "A\n").unwrap();
    shell().run_line(&format!("echo B >> {}", file.display()));
    assert_eq!(read(&file), "A\nB\n");

    fs::write(&file, "A\n").unwrap();
    shell().run_line(&format!("echo B > {}", file.display()));
    assert_eq!(read(&file), "B\n");
}

#[test]
fn output_file_is_created_with_default_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = scratch_dir("mode");
    let file = dir.join("new");
    shell().run_line(&format!("echo x > {}", file.display()));
    let mode = fs::metadata(&file).unwrap().permissions().mode() & 0o777;
    // umask can only take bits away
    assert_eq!(mode & !0o644, 0);
    assert_ne!(mode & 0o600, 0);
}

#[test]
fn input_redirection_replaces_stdin() {
    let dir = scratch_dir("input");
    let input = dir.join("three");
    let out = dir.join("out");
    fs::write(&input, "one\ntwo\nthree\n").unwrap();
    shell().run_line(&format!("wc -l < {} > {}", input.display(), out.display()));
    assert_eq!(read(&out).trim(), "3");
}

#[test]
fn missing_input_file_fails_the_stage() {
    let dir = scratch_dir("missing-input");
    let marker = dir.join("marker");
    let report = shell().run_line(&format!(
        "cat < {} && touch {}",
        dir.join("absent").display(),
        marker.display()
    ));
    assert_eq!(report.status, 1);
    assert_eq!(report.spawned, 0);
    assert!(!marker.exists());
}

#[test]
fn strict_redirections_reject_the_line() {
    let mut config = Config::default();
    config.strict_redirections = true;
    let report = Shell::new(&config).run_line("echo hi >");
    assert_eq!(report.status, pipesh::shell::PARSE_FAILURE);
    assert_eq!(report.spawned, 0);
}

// ── Builtins ──

#[test]
fn history_lists_prior_lines_only() {
    let dir = scratch_dir("history");
    let out = dir.join("out");
    let mut shell = shell();
    shell.run_line("true\n");
    shell.run_line("false ; true\n");
    let report = shell.run_line(&format!("history > {}", out.display()));
    assert_eq!(report.status, 0);
    assert_eq!(report.spawned, 0);
    assert_eq!(read(&out), "1: true\n2: false ; true\n");
    assert_eq!(shell.history().len(), 3);
}

#[test]
fn history_as_pipeline_stage() {
    let dir = scratch_dir("history-pipe");
    let out = dir.join("out");
    let mut shell = shell();
    shell.run_line("true");
    shell.run_line("echo hello");
    shell.run_line(&format!("history | grep echo > {}", out.display()));
    assert_eq!(read(&out), "2: echo hello\n");
}

#[test]
fn empty_line_is_ignored() {
    let mut shell = shell();
    let report = shell.run_line("\n");
    assert_eq!(report.spawned, 0);
    assert!(shell.history().is_empty());
}

#[test]
fn exit_stops_the_rest_of_the_line() {
    let dir = scratch_dir("exit");
    let marker = dir.join("marker");
    let report = shell().run_line(&format!("exit ; touch {}", marker.display()));
    assert_eq!(report.flow, Flow::Exit);
    assert_eq!(report.spawned, 0);
    assert!(!marker.exists());
}

#[test]
fn exit_inside_pipeline_runs_nothing() {
    let dir = scratch_dir("exit-pipe");
    let marker = dir.join("marker");
    let report = shell().run_line(&format!("touch {} | exit", marker.display()));
    assert_eq!(report.flow, Flow::Exit);
    assert!(!marker.exists());
}

// ── Binary ──

fn pipesh(name: &str, line: &str) -> std::process::Output {
    let home = scratch_dir(name);
    Command::new(env!("CARGO_BIN_EXE_pipesh"))
        .args(["-c", line])
        .env("HOME", &home)
        .output()
        .unwrap()
}

#[test]
fn binary_runs_one_line() {
    let output = pipesh("bin-one-line", "echo hi | cat");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hi\n");
}

#[test]
fn binary_exit_code_is_last_status() {
    assert_eq!(pipesh("bin-status-and", "true && false").status.code(), Some(1));
    assert_eq!(pipesh("bin-status-exit", "exit ; false").status.code(), Some(0));
}

#[test]
fn binary_reports_missing_program() {
    let output = pipesh("bin-missing", "pipesh-no-such-program");
    assert_eq!(output.status.code(), Some(127));
    assert!(String::from_utf8_lossy(&output.stderr).contains("command not found"));
}
