use super::*;

impl App {
    pub(in crate::tui) fn handle_menu(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_index = move_up(self.menu_index);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_index = move_down(self.menu_index, self.profiles.len());
            }
            KeyCode::Enter => {
                if let Some(profile) = self.selected_profile() {
                    info!(profile = %profile.name, "Switching profile");
                    return Flow::Finish(SessionResult::switch(profile));
                }
            }
            KeyCode::Char('n') => {
                self.name_input = InputField::new("Profile name");
                self.screen = Screen::NamePrompt;
            }
            KeyCode::Char('e') => {
                if let Some(profile) = self.selected_profile().cloned() {
                    self.selection = profile.flake_set();
                    self.catalog_index = 0;
                    self.target = Some(profile);
                    self.screen = Screen::BundleSelect(Mode::Edit);
                }
            }
            KeyCode::Char('d') => {
                if let Some(profile) = self.selected_profile().cloned() {
                    self.target = Some(profile);
                    self.screen = Screen::DeleteConfirm;
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Finish(SessionResult::Cancel),
            _ => {}
        }
        Flow::Continue
    }

    pub(in crate::tui) fn handle_name_prompt(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Enter => {
                if is_valid_name(self.name_input.trimmed()) {
                    self.selection = BTreeSet::new();
                    self.catalog_index = 0;
                    self.target = None;
                    self.screen = Screen::BundleSelect(Mode::New);
                }
            }
            KeyCode::Esc => return self.back_to_menu(),
            KeyCode::Backspace => self.name_input.pop(),
            KeyCode::Char(ch) => self.name_input.push(ch),
            _ => {}
        }
        Flow::Continue
    }

    pub(in crate::tui) fn handle_delete_confirm(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Char('y') => {
                if let Some(profile) = self.target.take() {
                    info!(profile = %profile.name, "Deleting profile");
                    let result = jobs::delete_profile(&self.store, &self.settings, &profile);
                    self.reload_profiles();
                    if let Err(err) = result {
                        self.banner = Some(format!("Delete {}: {err}", profile.name));
                    }
                }
                self.menu_index = 0;
                self.back_to_menu()
            }
            KeyCode::Char('n') | KeyCode::Esc => self.back_to_menu(),
            _ => Flow::Continue,
        }
    }
}
