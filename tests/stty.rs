// This file is part of the uutils coreutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

// spell-checker:ignore ixon ispeed ospeed

use std::fs::File;
use std::process::{Command, Output, Stdio};

fn stty(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stty"))
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run stty")
}

fn stderr_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn stdout_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn fails_with(args: &[&str], message: &str) {
    let out = stty(args);
    assert_eq!(out.status.code(), Some(1), "args: {args:?}");
    let stderr = stderr_of(&out);
    assert!(
        stderr.contains(message),
        "args {args:?}: expected {message:?} in {stderr:?}"
    );
}

#[test]
fn output_styles_are_mutually_exclusive() {
    fails_with(
        &["-a", "-g"],
        "the options for verbose and stty-readable output styles are mutually exclusive",
    );
}

#[test]
fn output_style_forbids_settings() {
    fails_with(
        &["-a", "raw"],
        "when specifying an output style, modes may not be set",
    );
    fails_with(
        &["-g", "echo"],
        "when specifying an output style, modes may not be set",
    );
}

#[test]
fn unknown_settings_are_rejected_before_the_device_is_touched() {
    // Stdin is /dev/null here, so these can only pass if validation
    // happens without reading the terminal.
    fails_with(&["foo"], "invalid argument 'foo'");
    fails_with(&["-cs8"], "invalid argument '-cs8'");
    fails_with(&["1:2:3:4"], "invalid argument '1:2:3:4'");
}

#[test]
fn control_characters_need_an_argument() {
    fails_with(&["erase"], "missing argument to 'erase'");
    fails_with(&["min", "xyz"], "invalid integer argument 'xyz'");
}

#[test]
fn speed_arguments_are_validated() {
    fails_with(&["ispeed", "abc"], "invalid ispeed 'abc'");
    fails_with(
        &["ispeed", "9600", "ospeed", "300"],
        "asymmetric input (9600), output (300) speeds not supported",
    );
}

#[test]
fn drain_alone_is_not_a_mode_argument() {
    // "drain" only tunes how a write happens, so it neither conflicts
    // with an output style nor switches into the apply path on its own.
    let out = stty(&["-g", "drain"]);
    let stderr = stderr_of(&out);
    assert!(
        !stderr.contains("modes may not be set"),
        "stderr: {stderr:?}"
    );
}

#[test]
fn only_one_device_may_be_given() {
    fails_with(
        &["-F", "/dev/null", "-F", "/dev/null"],
        "only one device may be specified",
    );
}

#[test]
fn missing_device_is_reported_by_name() {
    let out = stty(&["-F", "/nonexistent/term", "sane"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr_of(&out).contains("/nonexistent/term"));
}

#[test]
fn arguments_after_double_dash_are_ignored() {
    // "stty -- -ixon" behaves like plain "stty"; with /dev/null on stdin
    // the terminal query itself must fail, not the argument parse.
    let out = stty(&["--", "-ixon"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = stderr_of(&out);
    assert!(stderr.contains("standard input"), "stderr: {stderr:?}");
    assert!(!stderr.contains("invalid argument"), "stderr: {stderr:?}");
}

// The remaining tests need a real controlling terminal.
fn dev_tty_save() -> Option<String> {
    if File::open("/dev/tty").is_err() {
        return None;
    }
    let out = stty(&["-F", "/dev/tty", "-g"]);
    if !out.status.success() {
        eprintln!("/dev/tty not usable; skipping");
        return None;
    }
    Some(stdout_of(&out).trim().to_string())
}

#[test]
fn save_string_round_trips_on_dev_tty() {
    let Some(save) = dev_tty_save() else { return };
    assert!(save.split(':').count() > 4);
    assert!(save
        .chars()
        .all(|c| c.is_ascii_hexdigit() || c == ':'));

    let out = stty(&["-F", "/dev/tty", &save]);
    assert!(out.status.success(), "stderr: {}", stderr_of(&out));

    let again = stty(&["-F", "/dev/tty", "-g"]);
    assert_eq!(save, stdout_of(&again).trim());
}

#[test]
fn corrupt_save_strings_on_dev_tty() {
    let Some(save) = dev_tty_save() else { return };

    // one field short: no longer recognized as a save string
    let (truncated, _) = save.rsplit_once(':').unwrap();
    let out = stty(&["-F", "/dev/tty", truncated]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr_of(&out).contains("invalid argument"));

    // right shape, broken hex
    let mut fields: Vec<String> = save.split(':').map(str::to_string).collect();
    fields[1] = "zz".into();
    let out = stty(&["-F", "/dev/tty", &fields.join(":")]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr_of(&out).contains("invalid integer argument"));
}

#[test]
fn default_display_starts_with_speed() {
    if dev_tty_save().is_none() {
        return;
    }
    let out = stty(&["-F", "/dev/tty"]);
    assert!(out.status.success());
    assert!(stdout_of(&out).starts_with("speed "));

    let all = stty(&["-F", "/dev/tty", "-a"]);
    assert!(all.status.success());
    let text = stdout_of(&all);
    assert!(text.contains("intr = "));
    assert!(text.contains("min = "));
}

#[test]
fn size_and_speed_settings_print_immediately() {
    if dev_tty_save().is_none() {
        return;
    }
    let out = stty(&["-F", "/dev/tty", "speed"]);
    assert!(out.status.success());
    let text = stdout_of(&out);
    let mut parts = text.split_whitespace();
    assert!(parts.next().is_some_and(|w| w.parse::<u64>().is_ok()));
}
