use std::process::{Command, Output};

fn clikit() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_clikit"));
    cmd.env("CLIKIT_PROGRAM_NAME", "clikit")
        .env("RUST_LOG", "info")
        .current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

fn run(args: &[&str]) -> Output {
    clikit()
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run clikit {args:?}: {e}"))
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn help_works() {
    for args in [&[][..], &["--help"][..], &["help"][..]] {
        let out = run(args);
        assert!(
            out.status.success(),
            "clikit {args:?} failed:\nstatus: {}\nstderr:\n{}",
            out.status,
            stderr(&out),
        );
        let stdout = stdout(&out);
        assert!(
            stdout.starts_with("Usage: clikit <command>")
                && stdout.contains("sync files")
                && stdout.contains("echo")
                && stdout.contains("exit"),
            "unexpected help output:\n{stdout}"
        );
    }
}

#[test]
fn command_help_ignores_required_options() {
    let out = run(&["sync", "files", "--help"]);
    assert!(
        out.status.success(),
        "sync files --help failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        stderr(&out),
    );
    let stdout = stdout(&out);
    assert!(
        stdout.contains(
            "SYNOPSIS\n  clikit sync files [-n] [--verbose] [--exclude <PATTERN>] [--mode MODE] \
             --from <SOURCE> --to <DEST>\n"
        ),
        "unexpected help output:\n{stdout}"
    );
    assert!(stdout.contains("  -n, --dry-run\n    Don't change anything\n"));
    assert!(!stdout.contains("--help"), "help option should be hidden:\n{stdout}");
}

#[test]
fn invalid_arguments_are_all_reported() {
    let out = run(&["sync", "files", "--bogus", "--mode", "link", "-n", "-n"]);
    assert_eq!(
        out.status.code(),
        Some(2),
        "expected invalid-arguments status:\nstderr:\n{}",
        stderr(&out)
    );
    assert!(stdout(&out).is_empty());
    let stderr = stderr(&out);
    for expected in [
        "clikit sync files: unknown option 'bogus'",
        "clikit sync files: --dry-run cannot be used multiple times",
        "clikit sync files: invalid --mode value: link",
        "clikit sync files: --from argument required",
        "clikit sync files: --to argument required",
    ] {
        assert!(stderr.contains(expected), "missing {expected:?} in:\n{stderr}");
    }
}

#[test]
fn combined_flags_and_separator() {
    let out = run(&["echo", "-uv", "--sep=-", "--", "-b", "--help"]);
    assert!(
        out.status.success(),
        "echo failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        stderr(&out),
    );
    assert_eq!(stdout(&out), "-B---HELP\n");

    // scanning stops at the first positional, so a later `--` is an argument
    let out = run(&["echo", "-u", "--sep=-", "a", "--", "-b", "--help"]);
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert_eq!(stdout(&out), "A-----B---HELP\n");
}

#[test]
fn argument_errors_survive_log_filter() {
    let out = clikit()
        .env("RUST_LOG", "off")
        .args(["sync", "files", "--from", "a", "--verbose=yes"])
        .output()
        .expect("failed to run clikit sync files");
    assert_eq!(out.status.code(), Some(2), "stderr:\n{}", stderr(&out));
    let stderr = stderr(&out);
    assert_eq!(
        stderr.lines().collect::<Vec<_>>(),
        vec!["clikit sync files: --to argument required"],
        "unexpected stderr:\n{stderr}"
    );
}

#[test]
fn sync_prints_json() {
    let out = run(&[
        "sync", "files", "--from", "src", "--to=dst", "--mode", "move", "--exclude", "*.o",
    ]);
    assert!(
        out.status.success(),
        "sync files failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        stderr(&out),
    );
    let json: serde_json::Value =
        serde_json::from_str(&stdout(&out)).expect("sync files output is not JSON");
    assert_eq!(json["options"]["mode"], "move");
    assert_eq!(json["options"]["to"], "dst");
    assert_eq!(json["options"]["exclude"], serde_json::json!(["*.o"]));
    assert_eq!(json["options"]["dry-run"], false);
}

#[test]
fn exit_status_comes_from_command() {
    let out = run(&["exit", "--status", "42"]);
    assert_eq!(out.status.code(), Some(42), "stderr:\n{}", stderr(&out));

    let out = run(&["exit", "--status", "x"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(
        stderr(&out).contains("clikit exit: invalid exit status: x"),
        "unexpected stderr:\n{}",
        stderr(&out)
    );
}

#[test]
fn unknown_command_fails() {
    let out = run(&["frobnicate"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(
        stderr(&out).contains("clikit: unknown command: frobnicate"),
        "unexpected stderr:\n{}",
        stderr(&out)
    );
}
