use anyhow::Context;
use homeflake_core::profile::Profile;
use serde::Serialize;
use std::path::PathBuf;

/// The single line a shell wrapper reads from stdout after the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum SessionResult {
    Switch {
        profile: String,
        home: PathBuf,
        flakes: Vec<String>,
    },
    Cancel,
    Error {
        error: String,
    },
}

impl SessionResult {
    pub fn switch(profile: &Profile) -> Self {
        SessionResult::Switch {
            profile: profile.name.clone(),
            home: profile.home.clone(),
            flakes: profile.flakes().to_vec(),
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            SessionResult::Switch { .. } => "switch",
            SessionResult::Cancel => "cancel",
            SessionResult::Error { .. } => "error",
        }
    }

    pub fn to_json_line(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("serialize session result")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn switch_carries_profile_fields() {
        let profile = Profile::new("dev", vec!["web".into()], Path::new("/h/.nix-homes"));
        let line = SessionResult::switch(&profile).to_json_line().unwrap();
        assert_eq!(
            line,
            r#"{"action":"switch","profile":"dev","home":"/h/.nix-homes/dev","flakes":["web"]}"#
        );
    }

    #[test]
    fn cancel_and_error_shapes() {
        assert_eq!(
            SessionResult::Cancel.to_json_line().unwrap(),
            r#"{"action":"cancel"}"#
        );
        let error = SessionResult::Error {
            error: "no tty".to_string(),
        };
        assert_eq!(
            error.to_json_line().unwrap(),
            r#"{"action":"error","error":"no tty"}"#
        );
        assert_eq!(error.action(), "error");
    }
}
