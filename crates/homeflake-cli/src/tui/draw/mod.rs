use super::*;

mod progress;
mod screens;
mod theme;

pub(in crate::tui) use theme::Theme;

impl App {
    pub(in crate::tui) fn draw(&self, frame: &mut Frame, theme: &Theme) {
        let area = frame.size();
        let lines = match self.screen {
            Screen::Progress => return self.draw_progress(frame, area, theme),
            Screen::Blocked => self.blocked_lines(theme),
            Screen::Menu => self.menu_lines(theme),
            Screen::NamePrompt => self.name_prompt_lines(theme),
            Screen::BundleSelect(mode) => self.bundle_select_lines(mode, theme),
            Screen::Confirm(mode) => self.confirm_lines(mode, theme),
            Screen::DeleteConfirm => self.delete_confirm_lines(theme),
            Screen::Success => self.success_lines(theme),
        };
        render_centered(frame, area, lines);
    }
}

fn render_centered(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let widest = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
    let width = widest.saturating_add(4).min(area.width).max(1);
    let height = lines
        .iter()
        .map(|line| (line.width() as u16).max(1).div_ceil(width))
        .sum();
    let rect = centered_rect(area, width, height);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), rect);
}

pub(in crate::tui) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
