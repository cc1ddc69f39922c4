use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access profiles at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("profiles file {path} is corrupt: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode profiles for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("profile '{0}' already exists")]
    DuplicateName(String),
    #[error("profile '{0}' not found")]
    NotFound(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleFailure {
    pub name: String,
    pub reason: String,
}

impl fmt::Display for BundleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.reason)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("{} flake(s) failed: {}", .failures.len(), join_failures(.failures))]
    PartialFailure { failures: Vec<BundleFailure> },
    #[error("failed to prepare home directory: {0}")]
    Bootstrap(String),
}

impl ProvisionError {
    pub fn failed_names(&self) -> Vec<&str> {
        match self {
            ProvisionError::PartialFailure { failures } => {
                failures.iter().map(|failure| failure.name.as_str()).collect()
            }
            ProvisionError::Bootstrap(_) => Vec::new(),
        }
    }
}

fn join_failures(failures: &[BundleFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_names_every_bundle() {
        let err = ProvisionError::PartialFailure {
            failures: vec![
                BundleFailure {
                    name: "web".to_string(),
                    reason: "exit status: 1".to_string(),
                },
                BundleFailure {
                    name: "cli".to_string(),
                    reason: "spawn failed".to_string(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "2 flake(s) failed: web: exit status: 1; cli: spawn failed"
        );
        assert_eq!(err.failed_names(), vec!["web", "cli"]);
    }

    #[test]
    fn store_errors_render_names() {
        assert_eq!(
            StoreError::DuplicateName("dev".into()).to_string(),
            "profile 'dev' already exists"
        );
        assert_eq!(
            StoreError::NotFound("dev".into()).to_string(),
            "profile 'dev' not found"
        );
    }
}
