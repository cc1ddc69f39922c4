use super::*;

mod bundles;
mod menu;
mod progress;

impl App {
    pub(in crate::tui) fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Flow::ForceQuit;
        }
        match self.screen {
            Screen::Blocked => Flow::Finish(SessionResult::Cancel),
            Screen::Menu => self.handle_menu(key),
            Screen::NamePrompt => self.handle_name_prompt(key),
            Screen::BundleSelect(mode) => self.handle_bundle_select(key, mode),
            Screen::Confirm(mode) => self.handle_confirm(key, mode),
            Screen::DeleteConfirm => self.handle_delete_confirm(key),
            Screen::Progress => self.handle_progress(key),
            Screen::Success => self.handle_success(key),
        }
    }

    pub(in crate::tui) fn back_to_menu(&mut self) -> Flow {
        self.screen = Screen::Menu;
        self.target = None;
        self.selection.clear();
        Flow::Continue
    }
}
