use super::*;

impl App {
    pub(in crate::tui) fn handle_progress(&mut self, key: KeyEvent) -> Flow {
        let Some(session) = self.session.as_ref() else {
            return self.back_to_menu();
        };
        if !session.is_terminal() || key.code != KeyCode::Enter {
            return Flow::Continue;
        }
        let failed = session.error().is_some();
        let mode = session.mode;
        if failed {
            self.session = None;
            self.reload_profiles();
            return self.back_to_menu();
        }
        match mode {
            // Edits never switch; the shell keeps its current home.
            Mode::Edit => Flow::Finish(SessionResult::Cancel),
            Mode::New => {
                self.session = None;
                self.cleanup = CleanupState::Idle;
                self.screen = Screen::Success;
                Flow::Continue
            }
        }
    }

    pub(in crate::tui) fn handle_success(&mut self, key: KeyEvent) -> Flow {
        match self.cleanup {
            CleanupState::Running => Flow::Continue,
            CleanupState::Finished(_) => match key.code {
                KeyCode::Char('q') => Flow::Finish(SessionResult::Cancel),
                _ => Flow::Continue,
            },
            CleanupState::Idle => match key.code {
                KeyCode::Enter => match &self.target {
                    Some(profile) => {
                        info!(profile = %profile.name, "Switching to new profile");
                        Flow::Finish(SessionResult::switch(profile))
                    }
                    None => Flow::Finish(SessionResult::Cancel),
                },
                KeyCode::Char('d') => match self.target.clone() {
                    Some(profile) => {
                        self.cleanup = CleanupState::Running;
                        Flow::Spawn(Job::Cleanup(profile))
                    }
                    None => Flow::Continue,
                },
                KeyCode::Char('q') | KeyCode::Esc => Flow::Finish(SessionResult::Cancel),
                _ => Flow::Continue,
            },
        }
    }

    pub(in crate::tui) fn handle_pipeline_event(&mut self, event: PipelineEvent) {
        match self.screen {
            Screen::Progress => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                match event {
                    PipelineEvent::Line(line) => session.log.push(line),
                    PipelineEvent::Done(outcome) => {
                        match &outcome {
                            Ok(()) => info!(profile = %session.profile.name, "Provisioning succeeded"),
                            Err(err) => warn!(profile = %session.profile.name, error = %err, "Provisioning failed"),
                        }
                        session.outcome = Some(outcome);
                    }
                }
            }
            Screen::Success if self.cleanup == CleanupState::Running => {
                if let PipelineEvent::Done(outcome) = event {
                    if let Err(err) = &outcome {
                        warn!(error = %err, "Cleanup finished with errors");
                    }
                    self.cleanup = CleanupState::Finished(outcome);
                }
            }
            _ => debug!(event = ?event, "Pipeline event outside an active job"),
        }
    }
}
