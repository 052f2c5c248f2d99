use std::fs;
use std::os::unix::fs::symlink;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn fdpeek(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fdpeek"))
        .args(args)
        // Keep a user's config file out of the picture.
        .env("XDG_CONFIG_HOME", env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("failed to run fdpeek")
}

/// Fake proc root with `count` pipe descriptors for process 555.
fn pipe_table(root: &Path, count: usize) {
    let fd_dir = root.join("555").join("fd");
    fs::create_dir_all(&fd_dir).unwrap();
    for fd in 0..count {
        symlink(format!("pipe:[{}]", 10_000 + fd), fd_dir.join(fd.to_string())).unwrap();
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn no_arguments_is_a_usage_error() {
    let out = fdpeek(&[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Usage"), "{}", stderr(&out));
    assert!(out.stdout.is_empty());
}

#[test]
fn too_many_arguments_is_a_usage_error() {
    let out = fdpeek(&["1", "2"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Usage"));
    assert!(out.stdout.is_empty());
}

#[test]
fn non_numeric_pid_is_rejected() {
    let out = fdpeek(&["abc"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Invalid PID"), "{}", stderr(&out));
    assert!(out.stdout.is_empty());
}

#[test]
fn non_positive_pids_are_rejected() {
    for pid in ["0", "-5"] {
        let out = fdpeek(&[pid]);
        assert_eq!(out.status.code(), Some(1), "pid {pid}");
        assert!(stderr(&out).contains("Invalid PID"), "{}", stderr(&out));
        assert!(out.stdout.is_empty());
    }
}

#[test]
fn help_exits_cleanly() {
    let out = fdpeek(&["--help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("PID"));
}

#[test]
fn missing_process_reports_error_and_exits_zero() {
    let root = tempfile::tempdir().unwrap();
    let out = fdpeek(&["--proc-root", root.path().to_str().unwrap(), "4242"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty(), "{}", stdout(&out));
    assert!(
        stderr(&out).contains("failed to open descriptor table for process 4242"),
        "{}",
        stderr(&out)
    );
}

#[test]
fn exited_child_is_table_unavailable() {
    let mut child = Command::new("true").spawn().unwrap();
    let pid = child.id().to_string();
    child.wait().unwrap();

    let out = fdpeek(&[pid.as_str()]);
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());
    assert!(stderr(&out).contains("failed to open descriptor table"));
}

#[test]
fn reports_fake_table() {
    let root = tempfile::tempdir().unwrap();
    let fd_dir = root.path().join("555").join("fd");
    fs::create_dir_all(&fd_dir).unwrap();

    let data = root.path().join("example.txt");
    fs::write(&data, "hello").unwrap();
    symlink(&data, fd_dir.join("3")).unwrap();
    symlink("pipe:[1001]", fd_dir.join("4")).unwrap();
    symlink("socket:[1002]", fd_dir.join("5")).unwrap();
    symlink("/gone/away (deleted)", fd_dir.join("6")).unwrap();

    let out = fdpeek(&["--proc-root", root.path().to_str().unwrap(), "555"]);
    assert_eq!(out.status.code(), Some(0));

    let text = stdout(&out);
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Open files for process ID 555:"));
    assert_eq!(lines.next().map(str::trim_end), Some("FD    Type       File Path"));

    let mut rows: Vec<Vec<&str>> = lines
        .map(|l| l.split_whitespace().collect())
        .collect();
    rows.sort_by(|a, b| a[0].cmp(b[0]));
    assert_eq!(rows.len(), 4, "{text}");

    let data = data.to_str().unwrap();
    assert_eq!(rows[0], vec!["3", "Regular", "File", data]);
    assert_eq!(rows[1], vec!["4", "FIFO", "(Named", "Pipe)", "pipe:[1001]"]);
    assert_eq!(rows[2], vec!["5", "Socket", "socket:[1002]"]);
    assert_eq!(rows[3], vec!["6", "Unknown", "/gone/away", "(deleted)"]);
    assert!(stderr(&out).contains("failed to stat"), "{}", stderr(&out));

    let skipped = fdpeek(&[
        "--skip-stale",
        "--quiet",
        "--proc-root",
        root.path().to_str().unwrap(),
        "555",
    ]);
    assert_eq!(skipped.status.code(), Some(0));
    assert_eq!(stdout(&skipped).lines().count(), 5);
    assert!(skipped.stderr.is_empty(), "{}", stderr(&skipped));
}

#[test]
fn inspects_test_process() {
    let pid = std::process::id().to_string();
    let out = fdpeek(&[pid.as_str()]);
    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);
    assert!(text.starts_with(&format!("Open files for process ID {pid}:\n")));
    assert!(text.lines().count() > 2, "{text}");
}

#[test]
fn invalid_config_falls_back_to_defaults() {
    let config_home = tempfile::tempdir().unwrap();
    let config_dir = config_home.path().join("fdpeek");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[general]\nstale_targets = \"explode\"\n",
    )
    .unwrap();

    let root = tempfile::tempdir().unwrap();
    pipe_table(root.path(), 2);

    let out = Command::new(env!("CARGO_BIN_EXE_fdpeek"))
        .args(["--proc-root", root.path().to_str().unwrap(), "555"])
        .env("XDG_CONFIG_HOME", config_home.path())
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);
    assert!(text.starts_with("Open files for process ID 555:\n"), "{text}");
    assert_eq!(text.lines().count(), 4, "{text}");
    let err = stderr(&out);
    assert!(err.contains("parsing config"), "{err}");
    assert!(err.contains("using default settings"), "{err}");
}

#[test]
fn closed_stdout_ends_quietly() {
    let root = tempfile::tempdir().unwrap();
    // Far more output than a pipe buffer holds.
    pipe_table(root.path(), 4000);

    let mut child = Command::new(env!("CARGO_BIN_EXE_fdpeek"))
        .args(["--proc-root", root.path().to_str().unwrap(), "555"])
        .env("XDG_CONFIG_HOME", env!("CARGO_MANIFEST_DIR"))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    drop(child.stdout.take());

    let out = child.wait_with_output().unwrap();
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stderr.is_empty(), "{}", stderr(&out));
}
