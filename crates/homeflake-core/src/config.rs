use anyhow::Context;
use directories::BaseDirs;
use std::env;
use std::path::{Component, Path, PathBuf};

const HOMES_DIR: &str = ".nix-homes";
const CATALOG_DIR: &str = "nix";
const STORE_FILE: &str = "nix-profiles.json";

/// Paths resolved once at startup from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub real_home: PathBuf,
    pub current_home: PathBuf,
    pub homes_root: PathBuf,
    pub catalog_dir: PathBuf,
    pub store_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let fallback = || {
            BaseDirs::new()
                .map(|dirs| dirs.home_dir().to_path_buf())
                .context("resolve home directory")
        };
        let current_home = match non_empty_var("HOME") {
            Some(home) => home,
            None => fallback()?,
        };
        let real_home = non_empty_var("REAL_HOME").unwrap_or_else(|| current_home.clone());
        Ok(Self::from_homes(real_home, current_home))
    }

    pub fn from_homes(real_home: PathBuf, current_home: PathBuf) -> Self {
        Self {
            homes_root: real_home.join(HOMES_DIR),
            catalog_dir: real_home.join(CATALOG_DIR),
            store_path: real_home.join(".config").join(STORE_FILE),
            real_home,
            current_home,
        }
    }

    pub fn with_catalog_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.catalog_dir = dir;
        }
        self
    }

    pub fn with_store_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.store_path = path;
        }
        self
    }

    pub fn home_for(&self, name: &str) -> PathBuf {
        self.homes_root.join(name)
    }

    /// Name of the managed profile this process is already running inside, if any.
    pub fn active_profile(&self) -> Option<String> {
        let relative = self.current_home.strip_prefix(&self.homes_root).ok()?;
        relative
            .components()
            .next()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
    }

    pub fn is_managed_home(&self, path: &Path) -> bool {
        match path.strip_prefix(&self.homes_root) {
            Ok(relative) => {
                relative.components().next().is_some()
                    && relative
                        .components()
                        .all(|component| matches!(component, Component::Normal(_)))
            }
            Err(_) => false,
        }
    }
}

fn non_empty_var(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_paths_from_real_home() {
        let settings =
            Settings::from_homes(PathBuf::from("/home/ada"), PathBuf::from("/home/ada"));
        assert_eq!(settings.homes_root, PathBuf::from("/home/ada/.nix-homes"));
        assert_eq!(settings.catalog_dir, PathBuf::from("/home/ada/nix"));
        assert_eq!(
            settings.store_path,
            PathBuf::from("/home/ada/.config/nix-profiles.json")
        );
        assert_eq!(
            settings.home_for("dev"),
            PathBuf::from("/home/ada/.nix-homes/dev")
        );
        assert_eq!(settings.active_profile(), None);
    }

    #[test]
    fn detects_running_inside_managed_home() {
        let settings = Settings::from_homes(
            PathBuf::from("/home/ada"),
            PathBuf::from("/home/ada/.nix-homes/work"),
        );
        assert_eq!(settings.active_profile(), Some("work".to_string()));
    }

    #[test]
    fn sibling_directory_is_not_managed() {
        let settings = Settings::from_homes(
            PathBuf::from("/home/ada"),
            PathBuf::from("/home/ada/.nix-homes-old/work"),
        );
        assert_eq!(settings.active_profile(), None);
        assert!(!settings.is_managed_home(Path::new("/home/ada/.nix-homes")));
        assert!(settings.is_managed_home(Path::new("/home/ada/.nix-homes/x")));
        assert!(!settings.is_managed_home(Path::new("/home/ada/.nix-homes/..")));
    }

    #[test]
    fn overrides_apply_only_when_present() {
        let settings = Settings::from_homes(PathBuf::from("/h"), PathBuf::from("/h"))
            .with_catalog_dir(Some(PathBuf::from("/flakes")))
            .with_store_path(None);
        assert_eq!(settings.catalog_dir, PathBuf::from("/flakes"));
        assert_eq!(settings.store_path, PathBuf::from("/h/.config/nix-profiles.json"));
    }
}
