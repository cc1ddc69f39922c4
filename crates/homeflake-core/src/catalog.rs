use anyhow::Context;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const FLAKE_MARKER: &str = "flake.nix";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flake {
    pub name: String,
    pub path: PathBuf,
}

/// Lists the immediate subdirectories of `dir` that hold a `flake.nix`,
/// sorted by name. A missing directory yields an empty catalog.
pub fn discover(dir: &Path) -> anyhow::Result<Vec<Flake>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %dir.display(), "Catalog directory missing");
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("read catalog {}", dir.display()));
        }
    };

    let mut flakes = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read catalog entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_dir() || !path.join(FLAKE_MARKER).is_file() {
            continue;
        }
        flakes.push(Flake {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
        });
    }
    flakes.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = flakes.len(), path = %dir.display(), "Discovered flakes");
    Ok(flakes)
}

pub fn names(flakes: &[Flake]) -> Vec<String> {
    flakes.iter().map(|flake| flake.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn flake_dir(root: &Path, name: &str, marker: bool) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        if marker {
            fs::write(dir.join(FLAKE_MARKER), "{ }").unwrap();
        }
    }

    #[test]
    fn only_marked_directories_in_name_order() {
        let tmp = TempDir::new().unwrap();
        flake_dir(tmp.path(), "c", true);
        flake_dir(tmp.path(), "b", false);
        flake_dir(tmp.path(), "a", true);
        fs::write(tmp.path().join("flake.nix"), "{ }").unwrap();

        let flakes = discover(tmp.path()).unwrap();
        assert_eq!(names(&flakes), vec!["a".to_string(), "c".to_string()]);
        assert_eq!(flakes[0].path, tmp.path().join("a"));
    }

    #[test]
    fn missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let flakes = discover(&tmp.path().join("nope")).unwrap();
        assert!(flakes.is_empty());
    }

    #[test]
    fn discovery_is_repeatable() {
        let tmp = TempDir::new().unwrap();
        flake_dir(tmp.path(), "web", true);
        flake_dir(tmp.path(), "cli", true);
        let first = discover(tmp.path()).unwrap();
        let second = discover(tmp.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(names(&first), vec!["cli".to_string(), "web".to_string()]);
    }
}
