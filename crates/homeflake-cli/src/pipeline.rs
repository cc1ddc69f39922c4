//! Background jobs that stream progress lines back to the UI loop.
//!
//! The worker runs on the blocking pool and reports through two channels: a
//! bounded line channel and a one-shot outcome. The outcome is always sent
//! before the line sender drops, so a consumer that drains lines until the
//! channel closes has the outcome ready right after the last line.

use tokio::sync::{mpsc, oneshot};

pub const PROGRESS_CAPACITY: usize = 100;

pub type Outcome = Result<(), String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Line(String),
    Done(Outcome),
}

pub struct Pipeline {
    lines: mpsc::Receiver<String>,
    outcome: Option<oneshot::Receiver<Outcome>>,
}

impl Pipeline {
    /// Runs `work` on the blocking pool. Must be called inside a tokio runtime.
    pub fn start<F>(work: F) -> Self
    where
        F: FnOnce(&dyn Fn(String)) -> Outcome + Send + 'static,
    {
        let (line_tx, lines) = mpsc::channel(PROGRESS_CAPACITY);
        let (outcome_tx, outcome) = oneshot::channel();
        tokio::task::spawn_blocking(move || {
            let emit = |line: String| {
                // A closed channel means the UI is gone; the job still finishes.
                let _ = line_tx.blocking_send(line);
            };
            let result = work(&emit);
            let _ = outcome_tx.send(result);
            drop(line_tx);
        });
        Self {
            lines,
            outcome: Some(outcome),
        }
    }

    /// Next line in emission order, then exactly one `Done`, then `None`.
    pub async fn next_event(&mut self) -> Option<PipelineEvent> {
        let outcome = self.outcome.as_mut()?;
        if let Some(line) = self.lines.recv().await {
            return Some(PipelineEvent::Line(line));
        }
        let result = outcome
            .await
            .unwrap_or_else(|_| Err("worker stopped without reporting an outcome".to_string()));
        self.outcome = None;
        Some(PipelineEvent::Done(result))
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(mut pipeline: Pipeline) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        while let Some(event) = pipeline.next_event().await {
            events.push(event);
        }
        assert!(pipeline.is_finished());
        events
    }

    #[tokio::test]
    async fn delivers_lines_in_order_before_done() {
        let pipeline = Pipeline::start(|emit| {
            for index in 0..250 {
                emit(format!("line {index}"));
            }
            Ok(())
        });
        let events = collect(pipeline).await;
        assert_eq!(events.len(), 251);
        for (index, event) in events.iter().take(250).enumerate() {
            assert_eq!(event, &PipelineEvent::Line(format!("line {index}")));
        }
        assert_eq!(events.last(), Some(&PipelineEvent::Done(Ok(()))));
    }

    #[tokio::test]
    async fn reports_failure_outcome() {
        let pipeline = Pipeline::start(|emit| {
            emit("Installing...".to_string());
            Err("1 flake(s) failed".to_string())
        });
        let events = collect(pipeline).await;
        assert_eq!(
            events,
            vec![
                PipelineEvent::Line("Installing...".to_string()),
                PipelineEvent::Done(Err("1 flake(s) failed".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn panicking_worker_still_terminates() {
        let pipeline = Pipeline::start(|emit| {
            emit("before".to_string());
            panic!("boom");
        });
        let events = collect(pipeline).await;
        assert_eq!(events.first(), Some(&PipelineEvent::Line("before".to_string())));
        assert!(matches!(events.last(), Some(PipelineEvent::Done(Err(_)))));
    }
}
