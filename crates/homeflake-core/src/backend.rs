use std::path::Path;

/// One entry of a nix profile listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    /// Original flake reference, e.g. `path:/home/ada/nix/web`.
    pub source: String,
}

impl InstalledPackage {
    /// True when the package was installed from exactly `flake_path`.
    pub fn comes_from(&self, flake_path: &Path) -> bool {
        if flake_path.as_os_str().is_empty() {
            return false;
        }
        source_path(&self.source).is_some_and(|path| path == flake_path)
    }
}

/// Local filesystem path of a flake reference such as
/// `path:/home/ada/nix/web?narHash=...`. Non-local references yield `None`.
fn source_path(source: &str) -> Option<&Path> {
    let reference = source.trim().split(['?', '#']).next()?;
    let path = ["path:", "git+file://", "file://"]
        .iter()
        .find_map(|scheme| reference.strip_prefix(scheme))
        .or_else(|| reference.starts_with('/').then_some(reference))?;
    (!path.is_empty()).then(|| Path::new(path))
}

/// Package operations against a single profile path.
pub trait PackageBackend: Send + Sync {
    fn list_installed(&self, profile: &Path) -> anyhow::Result<Vec<InstalledPackage>>;
    fn remove(&self, profile: &Path, name: &str) -> anyhow::Result<()>;
    /// Installs the flake, handing every output line to `on_line` as it arrives.
    fn install(
        &self,
        profile: &Path,
        flake: &Path,
        on_line: &mut dyn FnMut(&str),
    ) -> anyhow::Result<()>;
    fn upgrade_all(&self, profile: &Path) -> anyhow::Result<String>;
}

/// One-time tooling run after the first successful install into a new home.
pub trait FirstRunSetup: Send + Sync {
    fn run(&self, home: &Path, emit: &dyn Fn(String));
}
