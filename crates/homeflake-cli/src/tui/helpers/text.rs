use super::*;
use std::path::Path;

pub(in crate::tui) const SPINNER_FRAMES: [&str; 10] =
    ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(in crate::tui) fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Shows `path` relative to `home` as `~/...` when it lives under it.
pub(in crate::tui) fn tilde_path(path: &Path, home: &Path) -> String {
    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}

/// Last non-empty log line, trimmed for the footer.
pub(in crate::tui) fn current_step(log: &[String]) -> Option<&str> {
    log.iter()
        .rev()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())
}

pub(in crate::tui) fn log_tail(log: &[String], height: usize) -> &[String] {
    let start = log.len().saturating_sub(height);
    &log[start..]
}

/// `key: action` pairs joined with the muted separator used in every footer.
pub(in crate::tui) fn help_line(theme: &Theme, pairs: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(pairs.len() * 3);
    for (index, (key, action)) in pairs.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled("  •  ", theme.muted()));
        }
        spans.push(Span::styled(key.to_string(), theme.highlight()));
        spans.push(Span::styled(format!(" {action}"), theme.muted()));
    }
    Line::from(spans)
}
