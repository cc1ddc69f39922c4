use crate::backend::{FirstRunSetup, PackageBackend};
use crate::error::ProvisionError;
use crate::home;
use crate::profile::Profile;
use crate::runner;
use std::path::PathBuf;
use tracing::{error, info};

/// Everything a provisioning worker needs, owned so it can move to another thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub profile: Profile,
    pub real_home: PathBuf,
    pub catalog_dir: PathBuf,
}

/// Bootstraps the profile home, installs its flakes and, on the first
/// activation of a home, runs the one-time setup tooling.
pub fn provision(
    request: &ProvisionRequest,
    backend: &dyn PackageBackend,
    setup: &dyn FirstRunSetup,
    emit: &dyn Fn(String),
) -> Result<(), ProvisionError> {
    let profile = &request.profile;
    info!(profile = %profile.name, home = %profile.home.display(), "Provisioning started");

    let first_run = match home::setup(&profile.home, &request.real_home) {
        Ok(first_run) => first_run,
        Err(err) => {
            let message = format!("{err:#}");
            error!(profile = %profile.name, error = %message, "Home bootstrap failed");
            emit(format!("Error: {message}"));
            return Err(ProvisionError::Bootstrap(message));
        }
    };
    if first_run {
        emit("Setting up home directory...".to_string());
    }

    let result = runner::install_flakes(
        backend,
        &profile.home,
        &request.catalog_dir,
        profile.flakes(),
        emit,
    );
    if result.is_ok() && first_run {
        setup.run(&profile.home, emit);
    }
    match &result {
        Ok(()) => info!(profile = %profile.name, first_run, "Provisioning finished"),
        Err(err) => error!(profile = %profile.name, error = %err, "Provisioning failed"),
    }
    result
}
