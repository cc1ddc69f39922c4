use crate::backend::PackageBackend;
use crate::error::{BundleFailure, ProvisionError};
use crate::profile::profile_path;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Brings the profile in `home` to exactly `flakes`.
///
/// Removes installed packages that are no longer requested, installs every
/// requested flake that is not present yet, then upgrades everything. Only
/// install failures fail the run; they are collected so one broken flake
/// does not block the rest.
pub fn install_flakes(
    backend: &dyn PackageBackend,
    home: &Path,
    catalog_dir: &Path,
    flakes: &[String],
    emit: &dyn Fn(String),
) -> Result<(), ProvisionError> {
    let profile = profile_path(home);
    emit(format!("Profile: {}", profile.display()));
    emit(format!("Flakes: {}", flakes.join(", ")));
    emit(String::new());

    remove_unwanted(backend, &profile, flakes, emit);

    let mut failures = Vec::new();
    let total = flakes.len();
    for (index, name) in flakes.iter().enumerate() {
        let flake_path = catalog_dir.join(name);
        emit(format!("[{}/{}] Checking: {name}", index + 1, total));

        match backend.list_installed(&profile) {
            Ok(installed) if installed.iter().any(|pkg| pkg.comes_from(&flake_path)) => {
                emit("  ✓ Already installed".to_string());
                continue;
            }
            Ok(_) => {}
            Err(_) => emit("  Profile not yet created, will install...".to_string()),
        }

        emit(format!("  Installing {name}..."));
        let mut forward = |line: &str| {
            if !line.is_empty() {
                emit(format!("    {line}"));
            }
        };
        match backend.install(&profile, &flake_path, &mut forward) {
            Ok(()) => {
                info!(flake = %name, "Installed flake");
                emit("  ✓ Installed successfully".to_string());
            }
            Err(err) => {
                warn!(flake = %name, error = %format!("{err:#}"), "Flake install failed");
                emit(format!("  ✗ Failed: {err:#}"));
                failures.push(BundleFailure {
                    name: name.clone(),
                    reason: format!("{err:#}"),
                });
            }
        }
    }

    emit(String::new());
    emit("Upgrading all packages...".to_string());
    match backend.upgrade_all(&profile) {
        Ok(output) => {
            if !output.is_empty() {
                debug!(output = %output, "Upgrade output");
            }
            emit("  ✓ Upgrade complete".to_string());
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "Upgrade failed");
            emit(format!("  ⚠ {err:#}"));
        }
    }
    emit(String::new());

    if failures.is_empty() {
        emit("✓ Flakes installed".to_string());
        Ok(())
    } else {
        emit(format!("✗ {} flake(s) failed", failures.len()));
        Err(ProvisionError::PartialFailure { failures })
    }
}

fn remove_unwanted(
    backend: &dyn PackageBackend,
    profile: &Path,
    flakes: &[String],
    emit: &dyn Fn(String),
) {
    let installed = match backend.list_installed(profile) {
        Ok(installed) if !installed.is_empty() => installed,
        _ => return,
    };
    let wanted: BTreeSet<&str> = flakes.iter().map(String::as_str).collect();
    emit("Checking for flakes to remove...".to_string());
    for pkg in installed {
        if pkg.name.is_empty() || wanted.contains(pkg.name.as_str()) {
            continue;
        }
        emit(format!("  Removing: {}", pkg.name));
        match backend.remove(profile, &pkg.name) {
            Ok(()) => {
                info!(flake = %pkg.name, "Removed flake");
                emit("    ✓ Removed".to_string());
            }
            Err(err) => {
                warn!(flake = %pkg.name, error = %format!("{err:#}"), "Flake removal failed");
                emit(format!("    ⚠ Failed to remove: {err:#}"));
            }
        }
    }
    emit(String::new());
}
