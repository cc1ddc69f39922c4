use crate::error::StoreError;
use crate::profile::Profile;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// JSON-backed profile collection.
///
/// Every mutation re-reads the whole file, applies the change and rewrites
/// the whole file. A single interactive process is assumed; there is no
/// locking against concurrent writers.
#[derive(Clone, Debug)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_file(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io(source))?;
        }
        fs::write(&self.path, "[]").map_err(|source| self.io(source))?;
        info!(path = %self.path.display(), "Created empty profiles file");
        Ok(())
    }

    pub fn load(&self) -> Result<Vec<Profile>, StoreError> {
        self.ensure_file()?;
        let data = fs::read_to_string(&self.path).map_err(|source| self.io(source))?;
        let profiles: Vec<Profile> =
            serde_json::from_str(&data).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        debug!(count = profiles.len(), "Loaded profiles");
        Ok(profiles)
    }

    pub fn save(&self, profiles: &[Profile]) -> Result<(), StoreError> {
        self.ensure_file()?;
        let data = serde_json::to_string_pretty(profiles).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, data).map_err(|source| self.io(source))?;
        info!(count = profiles.len(), "Saved profiles");
        Ok(())
    }

    pub fn add(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut profiles = self.load()?;
        if profiles.iter().any(|p| p.name == profile.name) {
            return Err(StoreError::DuplicateName(profile.name.clone()));
        }
        profiles.push(profile.clone());
        self.save(&profiles)?;
        info!(profile = %profile.name, "Added profile");
        Ok(())
    }

    pub fn update(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut profiles = self.load()?;
        let slot = profiles
            .iter_mut()
            .find(|p| p.name == profile.name)
            .ok_or_else(|| StoreError::NotFound(profile.name.clone()))?;
        *slot = profile.clone();
        self.save(&profiles)?;
        info!(profile = %profile.name, flakes = ?profile.flakes(), "Updated profile");
        Ok(())
    }

    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let mut profiles = self.load()?;
        let before = profiles.len();
        profiles.retain(|p| p.name != name);
        if profiles.len() == before {
            return Err(StoreError::NotFound(name.to_string()));
        }
        self.save(&profiles)?;
        info!(profile = %name, "Deleted profile");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Profile, StoreError> {
        self.load()?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn io(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> ProfileStore {
        ProfileStore::new(tmp.path().join(".config").join("nix-profiles.json"))
    }

    fn profile(name: &str, flakes: &[&str]) -> Profile {
        Profile::new(
            name,
            flakes.iter().map(|f| f.to_string()).collect(),
            Path::new("/h/.nix-homes"),
        )
    }

    #[test]
    fn load_creates_missing_file() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(store.load().unwrap().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[test]
    fn add_then_load_contains_profile_once() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let dev = profile("dev", &["web"]);
        store.add(&dev).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![dev.clone()]);
        assert_eq!(store.get("dev").unwrap(), dev);
    }

    #[test]
    fn duplicate_add_leaves_store_unchanged() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.add(&profile("dev", &["web"])).unwrap();
        let before = store.load().unwrap();
        let err = store.add(&profile("dev", &["cli"])).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(name) if name == "dev"));
        assert_eq!(store.load().unwrap(), before);
    }

    #[test]
    fn delete_removes_and_repeat_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.add(&profile("dev", &[])).unwrap();
        store.add(&profile("ops", &[])).unwrap();
        store.delete("dev").unwrap();
        let names: Vec<_> = store.load().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["ops".to_string()]);
        assert!(matches!(store.delete("dev"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.get("dev"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn update_replaces_flakes_and_requires_existing_name() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let dev = profile("dev", &["web"]);
        store.add(&dev).unwrap();
        store.update(&dev.with_flakes(vec!["cli".into()])).unwrap();
        assert_eq!(store.get("dev").unwrap().flakes(), ["cli".to_string()]);
        let missing = profile("ghost", &[]);
        assert!(matches!(store.update(&missing), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn legacy_records_are_normalized_on_load_and_rewritten() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"[{"name":"old","home":"/h/.nix-homes/old","flake":"web"}]"#,
        )
        .unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded[0].flakes(), ["web".to_string()]);
        store.add(&profile("new", &[])).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("\"flake\""));
    }

    #[test]
    fn corrupt_file_is_reported_and_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));
        assert!(matches!(
            store.add(&profile("dev", &[])),
            Err(StoreError::Parse { .. })
        ));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[cfg(unix)]
    #[test]
    fn unencodable_profile_is_not_reported_as_corruption() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let root = Path::new(OsStr::from_bytes(b"/h/\xff"));
        let bad = Profile::new("bad", vec![], root);
        let err = store.add(&bad).unwrap_err();
        assert!(matches!(err, StoreError::Encode { .. }));
        assert!(!err.to_string().contains("corrupt"));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
    }
}
