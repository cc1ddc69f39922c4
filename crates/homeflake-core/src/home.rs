use crate::config::Settings;
use anyhow::{Context, bail};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

/// Entries linked from the real home into a fresh profile home.
pub const CONFIG_SYMLINKS: &[&str] = &[
    ".config",
    ".zshrc",
    ".zprofile",
    ".env",
    ".oh-my-zsh",
    ".gnupg",
    "nix",
    "Library/Keychains",
];

const NIX_BOOKKEEPING: &[&str] = &[".nix-profile", ".nix-defexpr", ".nix-channels"];

/// Creates `new_home` and, when it is still empty, links the shared
/// configuration from `real_home` into it. Returns `true` on first activation.
pub fn setup(new_home: &Path, real_home: &Path) -> anyhow::Result<bool> {
    fs::create_dir_all(new_home)
        .with_context(|| format!("create home directory {}", new_home.display()))?;

    let populated = count_user_entries(new_home)?;
    if populated > 0 {
        debug!(
            path = %new_home.display(),
            entries = populated,
            "Home directory not empty, skipping symlink setup"
        );
        return Ok(false);
    }

    info!(path = %new_home.display(), "Setting up symlinks");
    for item in CONFIG_SYMLINKS {
        let src = real_home.join(item);
        let dst = new_home.join(item);
        if !src.exists() {
            debug!(item, "Source does not exist, skipping");
            continue;
        }
        if dst.symlink_metadata().is_ok() {
            debug!(item, "Destination already exists, skipping");
            continue;
        }
        if let Some(parent) = dst.parent()
            && let Err(err) = fs::create_dir_all(parent)
        {
            warn!(item, error = %err, "Failed to create parent directory");
            continue;
        }
        if let Err(err) = symlink(&src, &dst) {
            warn!(item, error = %err, "Failed to create symlink");
            continue;
        }
        debug!(item, "Linked");
    }
    info!(path = %new_home.display(), "Symlink setup complete");
    Ok(true)
}

/// True when the home is missing or only holds nix bookkeeping entries.
pub fn is_pristine(home: &Path) -> bool {
    count_user_entries(home).map(|count| count == 0).unwrap_or(true)
}

/// Deletes a profile home. Only directories inside the managed root are
/// ever removed.
pub fn remove_home(home: &Path, settings: &Settings) -> anyhow::Result<()> {
    if home.as_os_str().is_empty() || home == settings.real_home {
        bail!("refusing to remove {}", home.display());
    }
    if !settings.is_managed_home(home) {
        bail!(
            "refusing to remove {}: not inside {}",
            home.display(),
            settings.homes_root.display()
        );
    }
    match fs::remove_dir_all(home) {
        Ok(()) => {
            info!(path = %home.display(), "Removed profile home");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("remove {}", home.display())),
    }
}

fn count_user_entries(dir: &Path) -> anyhow::Result<usize> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("read home directory {}", dir.display()))?;
    let mut count = 0;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if !NIX_BOOKKEEPING.iter().any(|skip| name == *skip) {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(unix)]
fn symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    if src.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(tmp: &TempDir) -> Settings {
        let real = tmp.path().join("real");
        Settings::from_homes(real.clone(), real)
    }

    #[test]
    fn first_run_links_existing_sources() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp);
        fs::create_dir_all(settings.real_home.join(".config")).unwrap();
        fs::write(settings.real_home.join(".zshrc"), "export A=1").unwrap();
        let home = settings.home_for("dev");

        assert!(setup(&home, &settings.real_home).unwrap());
        let link = fs::symlink_metadata(home.join(".zshrc")).unwrap();
        assert!(link.file_type().is_symlink());
        assert!(home.join(".config").exists());
        assert!(!home.join(".gnupg").exists());
    }

    #[test]
    fn second_run_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp);
        fs::create_dir_all(settings.real_home.join(".config")).unwrap();
        let home = settings.home_for("dev");
        assert!(setup(&home, &settings.real_home).unwrap());
        fs::write(settings.real_home.join(".zshrc"), "late").unwrap();
        assert!(!setup(&home, &settings.real_home).unwrap());
        assert!(fs::symlink_metadata(home.join(".zshrc")).is_err());
    }

    #[test]
    fn nix_bookkeeping_does_not_count_as_populated() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        fs::create_dir_all(home.join(".nix-defexpr")).unwrap();
        assert!(is_pristine(&home));
        assert!(is_pristine(&tmp.path().join("missing")));
        fs::write(home.join("notes"), "x").unwrap();
        assert!(!is_pristine(&home));
    }

    #[test]
    fn uncreatable_home_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "x").unwrap();
        assert!(setup(&blocker.join("dev"), tmp.path()).is_err());
    }

    #[test]
    fn remove_home_only_inside_managed_root() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp);
        let home = settings.home_for("dev");
        fs::create_dir_all(home.join("sub")).unwrap();
        remove_home(&home, &settings).unwrap();
        assert!(!home.exists());
        remove_home(&home, &settings).unwrap();
        assert!(remove_home(&settings.real_home, &settings).is_err());
        assert!(remove_home(tmp.path(), &settings).is_err());
    }
}
