//! Subprocess capture for the `stdout()` builtin.

use std::process::Command;

/// Run `argv` synchronously (no shell) and return its trimmed standard
/// output.  Spawn failures yield `None`; a non-zero exit status still
/// yields whatever the process printed.
pub fn capture_stdout(argv: &[String]) -> Option<String> {
    let (cmd, rest) = argv.split_first()?;
    let output = Command::new(cmd).args(rest).output().ok()?;
    Some(String::from_utf8_lossy(&output.stdout).trim().to_owned())
}
