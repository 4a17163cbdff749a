use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run_eval(source: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_syntax-repl"))
        .args(["-e", source])
        .output()
        .expect("failed to run syntax-repl")
}

fn run_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_syntax-repl"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run syntax-repl");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait")
}

fn run_file(source: &str) -> Output {
    let mut tmp = tempfile::NamedTempFile::with_suffix(".cmd").expect("failed to create temp file");
    tmp.write_all(source.as_bytes()).expect("failed to write");
    tmp.flush().expect("failed to flush");
    Command::new(env!("CARGO_BIN_EXE_syntax-repl"))
        .arg(tmp.path())
        .output()
        .expect("failed to run syntax-repl")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("non-utf8 output")
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("non-utf8 output")
}

#[test]
fn eval_prints_tree() {
    let out = run_eval("x = 1;");
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "SimpleAssignment 1:1-1:7\n  target: Identifier x\n  value: Number 1\n"
    );
}

#[test]
fn eval_value_command() {
    let out = run_eval("a ?? b .. c");
    assert!(out.status.success());
    assert!(stdout(&out).starts_with("Expression 1:1-1:12\n  value: Binary Coalesce (??)\n"));
}

#[test]
fn missing_terminator_exits_nonzero() {
    let out = run_eval("x = 1");
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("error[E0202]"), "{err}");
    assert!(err.contains("  | x = 1"), "{err}");
}

#[test]
fn warnings_do_not_fail_the_run() {
    let out = run_eval("a, b, c = 1, 2;");
    assert!(out.status.success());
    assert!(stderr(&out).contains("warning[W0001]"));
    assert!(stdout(&out).starts_with("ParallelAssignment"));
}

#[test]
fn piped_lines_accumulate_until_brackets_close() {
    let out = run_stdin(&[], "if ready {\n  go(1,\n     2);\n}\nn += 1;\n");
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("Statement 1:1-4:2\n  If\n"), "{text}");
    assert!(text.contains("CompoundAssignment 1:1-1:8\n"), "{text}");
}

#[test]
fn recovery_after_bad_line() {
    let out = run_stdin(&[], "1 = 2;\n)\nok = 3;\n");
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("E0301"), "{err}");
    assert!(err.contains("E0201"), "{err}");
    let text = stdout(&out);
    assert!(text.contains("target: Identifier ok"), "{text}");
}

#[test]
fn deep_nesting_is_a_diagnostic() {
    let depth = 3000;
    let source = format!("f({}1{});", "(".repeat(depth), ")".repeat(depth));
    let out = run_eval(&source);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("error[E0207]"));

    let out = run_stdin(&["--max-nesting", "2"], "f(1);
f((1));
ok = 1;
");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("E0207"));
    let text = stdout(&out);
    assert!(text.contains("target: Identifier ok"), "{text}");
}

#[test]
fn multi_line_flag() {
    let out = run_stdin(&["--multi-line"], "x = (1\n+ 2);\n\ny = 3;\n");
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("SimpleAssignment 1:1-2:6\n"), "{text}");
    assert!(text.contains("SimpleAssignment 1:1-1:7\n"), "{text}");
}

#[test]
fn session_commands_from_stdin() {
    let out = run_stdin(&[], "#status\n#mode\n#quit\nx = 1;\n");
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("mode: single-line"), "{text}");
    assert!(text.contains("mode: multi-line"), "{text}");
    assert!(!text.contains("SimpleAssignment"), "{text}");
}

#[test]
fn file_argument() {
    let out = run_file("// setup\nvar total = 0;\nfor n in items {\n  total += n;\n}\n");
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Var total"), "{text}");
    assert!(text.contains("ForIn n"), "{text}");
}

#[test]
fn unfinished_file_reports_end_of_input() {
    let out = run_file("func f(a) {\n  return a;\n");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("E0203"));
}

#[test]
fn missing_file() {
    let out = Command::new(env!("CARGO_BIN_EXE_syntax-repl"))
        .arg("/nonexistent/input.cmd")
        .output()
        .expect("failed to run syntax-repl");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("cannot read"));
}
