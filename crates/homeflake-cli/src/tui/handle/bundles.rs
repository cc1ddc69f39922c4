use super::*;

impl App {
    pub(in crate::tui) fn handle_bundle_select(&mut self, key: KeyEvent, mode: Mode) -> Flow {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.catalog_index = move_up(self.catalog_index);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.catalog_index = move_down(self.catalog_index, self.catalog.len());
            }
            KeyCode::Char(' ') | KeyCode::Tab => self.toggle_flake_at_cursor(),
            KeyCode::Enter => self.screen = Screen::Confirm(mode),
            KeyCode::Esc => return self.back_to_menu(),
            _ => {}
        }
        Flow::Continue
    }

    pub(in crate::tui) fn handle_confirm(&mut self, key: KeyEvent, mode: Mode) -> Flow {
        match key.code {
            KeyCode::Char('y') => self.commit(mode),
            KeyCode::Char('n') | KeyCode::Esc => self.back_to_menu(),
            _ => Flow::Continue,
        }
    }

    fn toggle_flake_at_cursor(&mut self) {
        let Some(flake) = self.catalog.get(self.catalog_index) else {
            return;
        };
        if !self.selection.remove(&flake.name) {
            self.selection.insert(flake.name.clone());
        }
    }

    /// Selected flakes in catalog order; names no longer in the catalog keep
    /// their place at the end so an edit never silently drops them.
    pub(in crate::tui) fn selected_flakes(&self) -> Vec<String> {
        let mut flakes: Vec<String> = self
            .catalog
            .iter()
            .filter(|flake| self.selection.contains(&flake.name))
            .map(|flake| flake.name.clone())
            .collect();
        for name in &self.selection {
            if !flakes.contains(name) {
                flakes.push(name.clone());
            }
        }
        flakes
    }

    /// The profile a confirm screen would persist.
    pub(in crate::tui) fn pending_profile(&self, mode: Mode) -> Option<Profile> {
        let flakes = self.selected_flakes();
        match mode {
            Mode::New => Some(Profile::new(
                self.name_input.trimmed(),
                flakes,
                &self.settings.homes_root,
            )),
            Mode::Edit => self.target.as_ref().map(|target| target.with_flakes(flakes)),
        }
    }

    fn commit(&mut self, mode: Mode) -> Flow {
        let Some(profile) = self.pending_profile(mode) else {
            return self.back_to_menu();
        };
        let saved = match mode {
            Mode::New => self.store.add(&profile),
            Mode::Edit => self.store.update(&profile),
        };
        self.target = Some(profile.clone());
        self.screen = Screen::Progress;
        match saved {
            Ok(()) => {
                info!(profile = %profile.name, mode = ?mode, flakes = %profile.flakes_display(), "Profile saved");
                self.session = Some(ProgressSession::running(profile.clone(), mode));
                Flow::Spawn(Job::Provision(ProvisionRequest {
                    profile,
                    real_home: self.settings.real_home.clone(),
                    catalog_dir: self.settings.catalog_dir.clone(),
                }))
            }
            Err(err) => {
                warn!(profile = %profile.name, error = %err, "Profile save failed");
                self.session = Some(ProgressSession::failed(profile, mode, err.to_string()));
                Flow::Continue
            }
        }
    }
}
