use super::*;
use homeflake_core::backend::{FirstRunSetup, PackageBackend};
use homeflake_core::home;
use homeflake_core::session;

/// Shared handles a background job needs; cloned into each worker.
#[derive(Clone)]
pub(in crate::tui) struct JobContext {
    pub(in crate::tui) settings: Settings,
    pub(in crate::tui) store: ProfileStore,
    pub(in crate::tui) backend: Arc<dyn PackageBackend>,
    pub(in crate::tui) setup: Arc<dyn FirstRunSetup>,
}

impl JobContext {
    pub(in crate::tui) fn new(
        settings: Settings,
        backend: Arc<dyn PackageBackend>,
        setup: Arc<dyn FirstRunSetup>,
    ) -> Self {
        Self {
            store: ProfileStore::new(settings.store_path.clone()),
            settings,
            backend,
            setup,
        }
    }

    pub(in crate::tui) fn launch(&self, job: Job) -> Pipeline {
        match job {
            Job::Provision(request) => {
                info!(profile = %request.profile.name, "Starting provisioning job");
                let backend = Arc::clone(&self.backend);
                let setup = Arc::clone(&self.setup);
                Pipeline::start(move |emit| {
                    session::provision(&request, backend.as_ref(), setup.as_ref(), emit)
                        .map_err(|err| err.to_string())
                })
            }
            Job::Cleanup(profile) => {
                info!(profile = %profile.name, "Starting cleanup job");
                let store = self.store.clone();
                let settings = self.settings.clone();
                Pipeline::start(move |_emit| delete_profile(&store, &settings, &profile))
            }
        }
    }
}

/// Removes the store record and the home directory. Both are attempted even
/// when the first fails.
pub(in crate::tui) fn delete_profile(
    store: &ProfileStore,
    settings: &Settings,
    profile: &Profile,
) -> Outcome {
    let mut problems = Vec::new();
    if let Err(err) = store.delete(&profile.name) {
        warn!(profile = %profile.name, error = %err, "Profile record removal failed");
        problems.push(err.to_string());
    }
    if let Err(err) = home::remove_home(&profile.home, settings) {
        warn!(
            profile = %profile.name,
            path = %profile.home.display(),
            error = %format!("{err:#}"),
            "Profile home removal failed"
        );
        problems.push(format!("{err:#}"));
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("; "))
    }
}
