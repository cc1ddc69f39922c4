use crate::command::{plain_output, stream_lines};
use homeflake_core::backend::FirstRunSetup;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::warn;

/// `mise` tool installation and `nvim` plugin sync, run with `HOME` pointed
/// at the new profile home.
#[derive(Clone, Debug)]
pub struct ToolchainSetup {
    mise: PathBuf,
    nvim: PathBuf,
}

impl Default for ToolchainSetup {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolchainSetup {
    pub fn new() -> Self {
        Self::with_programs(PathBuf::from("mise"), PathBuf::from("nvim"))
    }

    pub fn with_programs(mise: PathBuf, nvim: PathBuf) -> Self {
        Self { mise, nvim }
    }

    fn run_step(
        &self,
        home: &Path,
        program: &Path,
        label: &str,
        args: &[&str],
        emit: &dyn Fn(String),
    ) -> anyhow::Result<()> {
        let mut command = Command::new(program);
        command.args(args).env("HOME", home).env("MISE_YES", "1");
        plain_output(&mut command);
        let mut forward = |line: &str| {
            if !line.is_empty() {
                emit(format!("  {line}"));
            }
        };
        stream_lines(command, label, &mut forward)
    }
}

impl FirstRunSetup for ToolchainSetup {
    fn run(&self, home: &Path, emit: &dyn Fn(String)) {
        emit(String::new());
        emit("Running first-time setup...".to_string());

        emit(String::new());
        emit("[mise] Installing tools...".to_string());
        if let Err(err) = self.run_step(home, &self.mise, "mise", &["trust", "--all"], emit) {
            warn!(error = %format!("{err:#}"), "mise trust failed");
        }
        match self.run_step(home, &self.mise, "mise", &["install", "--yes"], emit) {
            Ok(()) => emit("  ✓ mise tools ready".to_string()),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "mise install failed");
                emit(format!("  ⚠ mise: {err:#}"));
            }
        }

        emit(String::new());
        emit("[nvim] Syncing plugins...".to_string());
        match self.run_step(
            home,
            &self.nvim,
            "nvim",
            &["--headless", "+Lazy! sync", "+qa"],
            emit,
        ) {
            Ok(()) => emit("  ✓ nvim plugins ready".to_string()),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "nvim plugin sync failed");
                emit(format!("  ⚠ nvim: {err:#}"));
            }
        }

        emit(String::new());
        emit("✓ All setup complete!".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn run_setup(setup: &ToolchainSetup, home: &Path) -> Vec<String> {
        let lines = RefCell::new(Vec::new());
        setup.run(home, &|line| lines.borrow_mut().push(line));
        lines.into_inner()
    }

    #[test]
    fn missing_tools_warn_and_setup_still_completes() {
        let tmp = TempDir::new().unwrap();
        let setup = ToolchainSetup::with_programs(
            PathBuf::from("homeflake-no-such-mise"),
            PathBuf::from("homeflake-no-such-nvim"),
        );
        let lines = run_setup(&setup, tmp.path());
        assert!(lines.contains(&"[mise] Installing tools...".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("  ⚠ mise: ")));
        assert!(lines.iter().any(|l| l.starts_with("  ⚠ nvim: ")));
        assert!(!lines.iter().any(|l| l.starts_with("  ✓")));
        assert_eq!(lines.last().unwrap(), "✓ All setup complete!");
    }

    #[cfg(unix)]
    #[test]
    fn successful_tools_stream_output_and_report_ready() {
        let tmp = TempDir::new().unwrap();
        let setup = ToolchainSetup::with_programs(PathBuf::from("echo"), PathBuf::from("true"));
        let lines = run_setup(&setup, tmp.path());
        assert!(lines.contains(&"  install --yes".to_string()));
        assert!(lines.contains(&"  ✓ mise tools ready".to_string()));
        assert!(lines.contains(&"  ✓ nvim plugins ready".to_string()));
        assert!(!lines.iter().any(|l| l.contains('⚠')));
        assert_eq!(lines.last().unwrap(), "✓ All setup complete!");
    }
}
