use anyhow::{Context, bail};
use regex::Regex;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::LazyLock;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07]*\x07").expect("valid ansi pattern")
});

pub fn strip_ansi(line: &str) -> String {
    ANSI_ESCAPE.replace_all(line, "").into_owned()
}

/// Environment applied to every external command so its output renders as
/// plain text inside the progress log.
pub fn plain_output(command: &mut Command) -> &mut Command {
    command
        .env("NIX_PAGER", "")
        .env("NO_COLOR", "1")
        .env_remove("FORCE_COLOR")
        .env_remove("CLICOLOR_FORCE")
}

/// Runs `command` with stdout and stderr merged, handing each line to
/// `on_line` as it is produced. Fails when the process cannot start or exits
/// unsuccessfully.
pub fn stream_lines(
    mut command: Command,
    label: &str,
    on_line: &mut dyn FnMut(&str),
) -> anyhow::Result<()> {
    let (reader, writer) = std::io::pipe().context("create output pipe")?;
    command
        .stdin(Stdio::null())
        .stdout(writer.try_clone().context("clone output pipe")?)
        .stderr(writer);
    let mut child = command
        .spawn()
        .with_context(|| format!("failed to start {label}"))?;
    // Release the parent's copies of the write end so the reader sees EOF.
    drop(command);

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("read {label} output"))?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        on_line(&strip_ansi(line.trim_end_matches(['\n', '\r'])));
    }

    let status = child.wait().with_context(|| format!("wait for {label}"))?;
    if !status.success() {
        bail!("{label} failed with {status}");
    }
    Ok(())
}

/// Runs `command` to completion and returns its combined output.
pub fn capture(mut command: Command, label: &str) -> anyhow::Result<String> {
    let output = command
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("failed to start {label}"))?;
    let stdout = strip_ansi(String::from_utf8_lossy(&output.stdout).trim());
    let stderr = strip_ansi(String::from_utf8_lossy(&output.stderr).trim());
    if !output.status.success() {
        let message = if !stderr.is_empty() { &stderr } else { &stdout };
        if message.is_empty() {
            bail!("{label} failed with {}", output.status);
        }
        bail!("{label} failed with {}: {message}", output.status);
    }
    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_color_sequences() {
        assert_eq!(strip_ansi("\x1b[1;32mok\x1b[0m done"), "ok done");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[cfg(unix)]
    #[test]
    fn streams_stdout_and_stderr_lines() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo one; echo two 1>&2; echo three"]);
        let mut lines = Vec::new();
        stream_lines(command, "sh", &mut |line| lines.push(line.to_string())).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"two".to_string()));
        assert_eq!(lines[0], "one");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_an_error() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo nope; exit 3"]);
        let mut lines = Vec::new();
        let err = stream_lines(command, "sh", &mut |line| lines.push(line.to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("sh failed"));
        assert_eq!(lines, vec!["nope".to_string()]);
    }

    #[test]
    fn missing_binary_is_an_error() {
        let command = Command::new("homeflake-definitely-missing-binary");
        assert!(capture(command, "missing").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn capture_reports_stderr_on_failure() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo bad 1>&2; exit 1"]);
        let err = capture(command, "sh").unwrap_err();
        assert!(err.to_string().ends_with(": bad"));
    }
}
