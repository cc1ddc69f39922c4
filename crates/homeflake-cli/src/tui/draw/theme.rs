use super::*;

/// Palette passed into every draw call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::tui) struct Theme {
    pub(in crate::tui) title: Color,
    pub(in crate::tui) accent: Color,
    pub(in crate::tui) danger: Color,
    pub(in crate::tui) warn: Color,
    pub(in crate::tui) success: Color,
    pub(in crate::tui) muted: Color,
    pub(in crate::tui) text: Color,
    pub(in crate::tui) tag_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Color::Rgb(0xb4, 0xbe, 0xfe),
            accent: Color::Rgb(0x94, 0xe2, 0xd5),
            danger: Color::Rgb(0xf3, 0x8b, 0xa8),
            warn: Color::Rgb(0xf9, 0xe2, 0xaf),
            success: Color::Rgb(0xa6, 0xe3, 0xa1),
            muted: Color::Rgb(0x6c, 0x70, 0x86),
            text: Color::Rgb(0xcd, 0xd6, 0xf4),
            tag_fg: Color::Rgb(0x1e, 0x1e, 0x2e),
        }
    }
}

impl Theme {
    pub(in crate::tui) fn title(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub(in crate::tui) fn highlight(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub(in crate::tui) fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub(in crate::tui) fn text(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub(in crate::tui) fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub(in crate::tui) fn danger(&self) -> Style {
        Style::default().fg(self.danger)
    }

    pub(in crate::tui) fn warn(&self) -> Style {
        Style::default().fg(self.warn)
    }

    pub(in crate::tui) fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub(in crate::tui) fn tag(&self) -> Style {
        Style::default().fg(self.tag_fg).bg(self.accent)
    }
}
