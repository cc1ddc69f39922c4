use super::*;

impl App {
    pub(in crate::tui) fn draw_progress(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let error = session.error();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(if error.is_some() { 2 } else { 0 }),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let verb = match session.mode {
            Mode::New => "Creating",
            Mode::Edit => "Updating",
        };
        let header = match &session.outcome {
            None => Line::from(vec![
                Span::styled(format!("{} ", spinner_frame(self.spinner)), theme.accent()),
                Span::styled(format!("{verb} {}", session.profile.name), theme.title()),
            ]),
            Some(Ok(())) => Line::styled(
                format!("✓ {}", session.profile.name),
                theme.success().add_modifier(Modifier::BOLD),
            ),
            Some(Err(_)) => Line::styled(
                format!("✗ {}", session.profile.name),
                theme.danger().add_modifier(Modifier::BOLD),
            ),
        };
        frame.render_widget(Paragraph::new(header), layout[0]);

        let rule = Line::styled("─".repeat(area.width as usize), theme.muted());
        frame.render_widget(Paragraph::new(rule.clone()), layout[1]);

        let log: Vec<Line<'static>> = log_tail(&session.log, layout[2].height as usize)
            .iter()
            .map(|line| style_log(line, theme))
            .collect();
        frame.render_widget(Paragraph::new(log), layout[2]);

        if let Some(error) = error {
            let text = Line::styled(format!("Error: {error}"), theme.danger());
            frame.render_widget(
                Paragraph::new(text).wrap(Wrap { trim: true }),
                layout[3],
            );
        }

        frame.render_widget(Paragraph::new(rule), layout[4]);

        let footer = match &session.outcome {
            None => Line::from(vec![
                Span::styled(format!("{} ", spinner_frame(self.spinner)), theme.accent()),
                Span::styled(
                    current_step(&session.log).unwrap_or("Starting...").to_string(),
                    theme.muted(),
                ),
            ]),
            Some(Ok(())) => help_line(theme, &[("enter", "continue")]),
            Some(Err(_)) => help_line(theme, &[("enter", "back to menu")]),
        };
        frame.render_widget(Paragraph::new(footer), layout[5]);
    }
}

/// Colors a runner log line by its status marker.
pub(in crate::tui) fn style_log(line: &str, theme: &Theme) -> Line<'static> {
    let trimmed = line.trim_start();
    let style = if trimmed.starts_with('✓') {
        theme.success()
    } else if trimmed.starts_with('✗')
        || trimmed.starts_with("Error")
        || trimmed.contains("failed")
    {
        theme.danger()
    } else if trimmed.starts_with('⚠') {
        theme.warn()
    } else if trimmed.starts_with('[') {
        theme.accent()
    } else {
        theme.text()
    };
    Line::styled(line.to_string(), style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_lines_are_styled_by_marker() {
        let theme = Theme::default();
        assert_eq!(style_log("  ✓ Installed successfully", &theme).style, theme.success());
        assert_eq!(style_log("  ✗ Failed: exit 1", &theme).style, theme.danger());
        assert_eq!(style_log("Error: disk full", &theme).style, theme.danger());
        assert_eq!(style_log("✗ 1 flake(s) failed", &theme).style, theme.danger());
        assert_eq!(style_log("    ⚠ Failed to remove: busy", &theme).style, theme.warn());
        assert_eq!(style_log("[1/2] Checking: web", &theme).style, theme.accent());
        assert_eq!(style_log("    copying path", &theme).style, theme.text());
    }
}
