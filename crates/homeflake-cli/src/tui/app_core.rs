use super::*;

impl App {
    pub(super) fn load(settings: Settings) -> Self {
        let store = ProfileStore::new(settings.store_path.clone());
        let catalog = match catalog::discover(&settings.catalog_dir) {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(
                    path = %settings.catalog_dir.display(),
                    error = %format!("{err:#}"),
                    "Catalog discovery failed"
                );
                Vec::new()
            }
        };
        let blocked = settings.active_profile();
        let screen = if blocked.is_some() {
            Screen::Blocked
        } else {
            Screen::Menu
        };
        let mut app = Self {
            settings,
            store,
            screen,
            blocked,
            profiles: Vec::new(),
            catalog,
            banner: None,
            menu_index: 0,
            catalog_index: 0,
            name_input: InputField::new("Profile name"),
            selection: BTreeSet::new(),
            target: None,
            session: None,
            cleanup: CleanupState::Idle,
            spinner: 0,
        };
        if app.blocked.is_none() {
            app.reload_profiles();
        }
        app
    }

    /// Re-reads the store. Failures leave an empty list and a banner.
    pub(in crate::tui) fn reload_profiles(&mut self) {
        match self.store.load() {
            Ok(profiles) => {
                self.profiles = profiles;
                self.banner = None;
            }
            Err(err) => {
                error!(
                    path = %self.store.path().display(),
                    error = %err,
                    "Profile store unreadable"
                );
                self.profiles = Vec::new();
                self.banner = Some(err.to_string());
            }
        }
        self.menu_index = clamp_index(self.menu_index, self.profiles.len());
    }

    pub(in crate::tui) fn selected_profile(&self) -> Option<&Profile> {
        self.profiles.get(self.menu_index)
    }

    /// True while a worker is running and the spinner should animate.
    pub(in crate::tui) fn is_busy(&self) -> bool {
        match self.screen {
            Screen::Progress => self
                .session
                .as_ref()
                .is_some_and(|session| !session.is_terminal()),
            Screen::Success => self.cleanup == CleanupState::Running,
            _ => false,
        }
    }

    pub(in crate::tui) fn tick(&mut self) {
        self.spinner = self.spinner.wrapping_add(1);
    }
}
