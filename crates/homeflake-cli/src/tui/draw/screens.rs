use super::*;

impl App {
    pub(in crate::tui) fn blocked_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let name = self.blocked.clone().unwrap_or_default();
        vec![
            Line::styled("Nix Home Profiles", theme.title()),
            Line::default(),
            Line::styled(format!("⚠ Already inside profile '{name}'"), theme.warn()),
            Line::styled(
                "Exit this shell to get back to your real home before switching.",
                theme.muted(),
            ),
            Line::default(),
            help_line(theme, &[("any key", "exit")]),
        ]
    }

    pub(in crate::tui) fn menu_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = vec![Line::styled("Nix Home Profiles", theme.title()), Line::default()];
        if let Some(banner) = &self.banner {
            lines.push(Line::styled(format!("⚠ {banner}"), theme.danger()));
            lines.push(Line::default());
        }
        if self.profiles.is_empty() {
            lines.push(Line::styled(
                "No profiles yet. Press n to create one.",
                theme.muted(),
            ));
        }
        for (index, profile) in self.profiles.iter().enumerate() {
            if index == self.menu_index {
                let mut spans = vec![Span::styled(format!("▸ {}", profile.name), theme.highlight())];
                if profile.flakes().is_empty() {
                    spans.push(Span::styled("  (no flakes)", theme.muted()));
                } else {
                    for flake in profile.flakes() {
                        spans.push(Span::raw(" "));
                        spans.push(Span::styled(format!(" {flake} "), theme.tag()));
                    }
                }
                lines.push(Line::from(spans));
            } else {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}", profile.name), theme.text()),
                    Span::styled(format!("  {}", profile.flakes_display()), theme.muted()),
                ]));
            }
        }
        lines.push(Line::default());
        lines.push(help_line(
            theme,
            &[
                ("↑/↓", "move"),
                ("enter", "switch"),
                ("n", "new"),
                ("e", "edit"),
                ("d", "delete"),
                ("q", "quit"),
            ],
        ));
        lines
    }

    pub(in crate::tui) fn name_prompt_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let name = self.name_input.trimmed();
        let home = if name.is_empty() {
            "Home: (type a name)".to_string()
        } else {
            let path = self.settings.home_for(name);
            format!("Home: {}", tilde_path(&path, &self.settings.real_home))
        };
        vec![
            Line::styled("New Profile", theme.title()),
            Line::default(),
            Line::from(vec![
                Span::styled(format!("{}: ", self.name_input.label), theme.text()),
                Span::styled(self.name_input.value.clone(), theme.highlight()),
                Span::styled("█", theme.accent()),
            ]),
            Line::styled(home, theme.muted()),
            Line::styled("Letters, digits, - _ . (max 30)", theme.muted()),
            Line::default(),
            help_line(theme, &[("enter", "continue"), ("esc", "back")]),
        ]
    }

    pub(in crate::tui) fn bundle_select_lines(&self, mode: Mode, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::styled(format!("Flakes for {}", self.pending_name(mode)), theme.title()),
            Line::default(),
        ];
        if self.catalog.is_empty() {
            lines.push(Line::styled(
                format!(
                    "No flakes found in {}",
                    tilde_path(&self.settings.catalog_dir, &self.settings.real_home)
                ),
                theme.muted(),
            ));
        }
        for (index, flake) in self.catalog.iter().enumerate() {
            let cursor = if index == self.catalog_index { "▸ " } else { "  " };
            let (marker, marker_style) = if self.selection.contains(&flake.name) {
                ("●", theme.success())
            } else {
                ("○", theme.muted())
            };
            let name_style = if index == self.catalog_index {
                theme.highlight()
            } else {
                theme.text()
            };
            lines.push(Line::from(vec![
                Span::styled(cursor, theme.accent()),
                Span::styled(marker, marker_style),
                Span::styled(format!(" {}", flake.name), name_style),
            ]));
        }
        lines.push(Line::default());
        lines.push(Line::styled(
            format!("{} selected", self.selection.len()),
            theme.muted(),
        ));
        lines.push(help_line(
            theme,
            &[
                ("↑/↓", "move"),
                ("space", "toggle"),
                ("enter", "confirm"),
                ("esc", "back"),
            ],
        ));
        lines
    }

    pub(in crate::tui) fn confirm_lines(&self, mode: Mode, theme: &Theme) -> Vec<Line<'static>> {
        let title = match mode {
            Mode::New => "Create profile?",
            Mode::Edit => "Update profile?",
        };
        let mut lines = vec![Line::styled(title, theme.title()), Line::default()];
        if let Some(profile) = self.pending_profile(mode) {
            lines.push(field_line(theme, "Name", profile.name.clone()));
            if mode == Mode::New {
                lines.push(field_line(
                    theme,
                    "Home",
                    tilde_path(&profile.home, &self.settings.real_home),
                ));
            }
            lines.push(field_line(theme, "Flakes", profile.flakes_display()));
        }
        lines.push(Line::default());
        lines.push(help_line(theme, &[("y", "confirm"), ("n", "cancel")]));
        lines
    }

    pub(in crate::tui) fn delete_confirm_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::styled("Delete profile?", theme.danger().add_modifier(Modifier::BOLD)),
            Line::default(),
        ];
        if let Some(profile) = &self.target {
            lines.push(field_line(theme, "Name", profile.name.clone()));
            lines.push(field_line(
                theme,
                "Home",
                tilde_path(&profile.home, &self.settings.real_home),
            ));
        }
        lines.push(Line::default());
        lines.push(Line::styled(
            "⚠ The home directory and everything in it will be removed.",
            theme.warn(),
        ));
        lines.push(Line::default());
        lines.push(help_line(theme, &[("y", "delete"), ("n", "cancel")]));
        lines
    }

    pub(in crate::tui) fn success_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if let Some(profile) = &self.target {
            lines.push(Line::styled(
                format!("✓ Profile '{}' is ready", profile.name),
                theme.success().add_modifier(Modifier::BOLD),
            ));
            lines.push(Line::styled(
                tilde_path(&profile.home, &self.settings.real_home),
                theme.muted(),
            ));
        }
        lines.push(Line::default());
        match &self.cleanup {
            CleanupState::Idle => lines.push(help_line(
                theme,
                &[("enter", "switch now"), ("d", "delete it"), ("q", "exit")],
            )),
            CleanupState::Running => lines.push(Line::styled(
                format!("{} Deleting...", spinner_frame(self.spinner)),
                theme.warn(),
            )),
            CleanupState::Finished(outcome) => {
                match outcome {
                    Ok(()) => lines.push(Line::styled("✓ Profile deleted", theme.success())),
                    Err(err) => lines.push(Line::styled(
                        format!("✗ Cleanup failed: {err}"),
                        theme.danger(),
                    )),
                }
                lines.push(Line::default());
                lines.push(help_line(theme, &[("q", "exit")]));
            }
        }
        lines
    }

    fn pending_name(&self, mode: Mode) -> String {
        match mode {
            Mode::New => self.name_input.trimmed().to_string(),
            Mode::Edit => self
                .target
                .as_ref()
                .map(|profile| profile.name.clone())
                .unwrap_or_default(),
        }
    }
}

fn field_line(theme: &Theme, label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<7}"), theme.muted()),
        Span::styled(value, theme.text()),
    ])
}
