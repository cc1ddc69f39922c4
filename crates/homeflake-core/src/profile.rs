use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// An isolated home directory together with the flakes installed into it.
///
/// Records are canonical by construction: deserialization goes through
/// [`StoredProfile`] and [`canonicalize`], so callers never observe the
/// legacy single-flake shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredProfile")]
pub struct Profile {
    pub name: String,
    pub home: PathBuf,
    flakes: Vec<String>,
}

/// On-disk shape, including the legacy `flake` field older files carry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub name: String,
    pub home: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flakes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flake: Option<String>,
}

impl Profile {
    pub fn new(name: &str, flakes: Vec<String>, homes_root: &Path) -> Self {
        Self {
            name: name.to_string(),
            home: homes_root.join(name),
            flakes: dedup(flakes),
        }
    }

    pub fn flakes(&self) -> &[String] {
        &self.flakes
    }

    pub fn flake_set(&self) -> BTreeSet<String> {
        self.flakes.iter().cloned().collect()
    }

    /// Replaces the flake set, producing a new record.
    pub fn with_flakes(&self, flakes: Vec<String>) -> Self {
        Self {
            name: self.name.clone(),
            home: self.home.clone(),
            flakes: dedup(flakes),
        }
    }

    pub fn flakes_display(&self) -> String {
        if self.flakes.is_empty() {
            "(no flakes)".to_string()
        } else {
            self.flakes.join(", ")
        }
    }

    pub fn profile_path(&self) -> PathBuf {
        profile_path(&self.home)
    }
}

impl From<StoredProfile> for Profile {
    fn from(stored: StoredProfile) -> Self {
        canonicalize(stored)
    }
}

impl From<Profile> for StoredProfile {
    fn from(profile: Profile) -> Self {
        Self {
            name: profile.name,
            home: profile.home,
            flakes: profile.flakes,
            flake: None,
        }
    }
}

/// Folds the legacy single `flake` into the flake list and drops duplicates.
pub fn canonicalize(stored: StoredProfile) -> Profile {
    let mut flakes = stored.flakes;
    if flakes.is_empty()
        && let Some(legacy) = stored.flake
    {
        flakes.push(legacy);
    }
    Profile {
        name: stored.name,
        home: stored.home,
        flakes: dedup(flakes),
    }
}

/// The nix profile link that lives inside a managed home.
pub fn profile_path(home: &Path) -> PathBuf {
    home.join(".nix-profile")
}

fn dedup(flakes: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    flakes
        .into_iter()
        .filter(|flake| !flake.is_empty() && seen.insert(flake.clone()))
        .collect()
}
