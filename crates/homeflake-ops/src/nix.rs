use crate::command::{capture, plain_output, stream_lines};
use homeflake_core::backend::{InstalledPackage, PackageBackend};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// `nix profile` against an explicit `--profile` path.
#[derive(Clone, Debug)]
pub struct NixProfileBackend {
    binary: PathBuf,
}

impl Default for NixProfileBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NixProfileBackend {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("nix"),
        }
    }

    pub fn with_binary(binary: PathBuf) -> Self {
        Self { binary }
    }

    fn profile_command(&self, subcommand: &str, profile: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command.arg("profile").arg(subcommand);
        command.arg("--profile").arg(profile);
        plain_output(&mut command);
        command
    }
}

impl PackageBackend for NixProfileBackend {
    fn list_installed(&self, profile: &Path) -> anyhow::Result<Vec<InstalledPackage>> {
        let output = capture(self.profile_command("list", profile), "nix profile list")?;
        let packages = parse_profile_list(&output);
        debug!(profile = %profile.display(), count = packages.len(), "Listed profile");
        Ok(packages)
    }

    fn remove(&self, profile: &Path, name: &str) -> anyhow::Result<()> {
        let mut command = self.profile_command("remove", profile);
        command.arg(name);
        capture(command, "nix profile remove")?;
        Ok(())
    }

    fn install(
        &self,
        profile: &Path,
        flake: &Path,
        on_line: &mut dyn FnMut(&str),
    ) -> anyhow::Result<()> {
        let mut command = self.profile_command("add", profile);
        command.arg(flake).args(["--priority", "1"]);
        stream_lines(command, "nix profile add", on_line)
    }

    fn upgrade_all(&self, profile: &Path) -> anyhow::Result<String> {
        let mut command = self.profile_command("upgrade", profile);
        command.arg(".*");
        capture(command, "nix profile upgrade")
    }
}

/// Parses the block format printed by `nix profile list`.
pub fn parse_profile_list(output: &str) -> Vec<InstalledPackage> {
    let mut packages = Vec::new();
    let mut current: Option<(InstalledPackage, Option<String>, Vec<String>)> = None;

    let finish = |entry: (InstalledPackage, Option<String>, Vec<String>),
                  packages: &mut Vec<InstalledPackage>| {
        let (mut package, locked, block) = entry;
        if package.source.is_empty() {
            package.source = locked.unwrap_or_else(|| block.join("\n"));
        }
        packages.push(package);
    };

    for line in output.lines() {
        let line = line.trim();
        if let Some(name) = line.strip_prefix("Name:") {
            if let Some(entry) = current.take() {
                finish(entry, &mut packages);
            }
            let package = InstalledPackage {
                name: name.trim().to_string(),
                source: String::new(),
            };
            current = Some((package, None, Vec::new()));
            continue;
        }
        let Some((package, locked, block)) = current.as_mut() else {
            continue;
        };
        if let Some(url) = line.strip_prefix("Original flake URL:") {
            package.source = url.trim().to_string();
        } else if let Some(url) = line.strip_prefix("Locked flake URL:") {
            *locked = Some(url.trim().to_string());
        }
        if !line.is_empty() {
            block.push(line.to_string());
        }
    }
    if let Some(entry) = current.take() {
        finish(entry, &mut packages);
    }
    packages
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
Name:               cli
Flake attribute:    packages.x86_64-linux.default
Original flake URL: path:/home/ada/nix/cli
Locked flake URL:   path:/home/ada/nix/cli?lastModified=1700000000&narHash=sha256-abc
Store paths:        /nix/store/aaa-cli

Name:               web
Flake attribute:    packages.x86_64-linux.default
Locked flake URL:   path:/home/ada/nix/web?narHash=sha256-def
Store paths:        /nix/store/bbb-web
";

    #[test]
    fn parses_names_and_sources() {
        let packages = parse_profile_list(LISTING);
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name, "cli");
        assert_eq!(packages[0].source, "path:/home/ada/nix/cli");
        assert_eq!(packages[1].name, "web");
        assert!(packages[1].comes_from(Path::new("/home/ada/nix/web")));
    }

    #[test]
    fn empty_listing_has_no_packages() {
        assert!(parse_profile_list("").is_empty());
        assert!(parse_profile_list("warning: something\n").is_empty());
    }

    #[test]
    fn missing_binary_fails_listing() {
        let backend = NixProfileBackend::with_binary(PathBuf::from("homeflake-no-such-nix"));
        assert!(backend.list_installed(Path::new("/tmp/profile")).is_err());
        let mut sink = |_: &str| {};
        assert!(
            backend
                .install(Path::new("/tmp/profile"), Path::new("/tmp/flake"), &mut sink)
                .is_err()
        );
    }
}
