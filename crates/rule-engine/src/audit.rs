use std::fmt::Display;
use std::time::Instant;

/// Status of a step in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// Step is running or completed successfully.
    Executed,
    /// Step failed during init or execute.
    Failed,
    /// Step was reverted successfully.
    Compensated,
    /// Step revert failed.
    CompensationFailed,
}

/// Record of one step position visited by a run.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Display name of the step.
    pub step: String,
    /// Current status.
    pub status: StepStatus,
    /// When the step started.
    pub started_at: Instant,
    /// When the step completed (execution or revert).
    pub completed_at: Option<Instant>,
    /// Redirection target returned by the step, if any.
    pub redirected_to: Option<String>,
    /// Position of the step in the run's history once it completed.
    pub history_position: Option<usize>,
}

/// Audit log of every step transition in a run.
///
/// Unlike the run's history, the log also keeps the step that failed and the
/// outcome of every revert.
#[derive(Debug, Clone, Default)]
pub struct RunAuditLog {
    records: Vec<StepRecord>,
}

impl RunAuditLog {
    /// Create a new empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&mut self, step: &impl Display) {
        self.records.push(StepRecord {
            step: step.to_string(),
            status: StepStatus::Executed,
            started_at: Instant::now(),
            completed_at: None,
            redirected_to: None,
            history_position: None,
        });
    }

    /// Mark the last step as failed.
    pub(crate) fn record_failure(&mut self) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Failed;
            record.completed_at = Some(Instant::now());
        }
    }

    /// Mark the last step as completed at `history_position`.
    pub(crate) fn record_success(&mut self, history_position: usize) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Executed;
            record.completed_at = Some(Instant::now());
            record.history_position = Some(history_position);
        }
    }

    pub(crate) fn record_redirect(&mut self, target: &impl Display) {
        if let Some(record) = self.records.last_mut() {
            record.redirected_to = Some(target.to_string());
        }
    }

    pub(crate) fn record_compensated(&mut self, history_position: usize) {
        self.update_completed(history_position, StepStatus::Compensated);
    }

    pub(crate) fn record_compensation_failed(&mut self, history_position: usize) {
        self.update_completed(history_position, StepStatus::CompensationFailed);
    }

    fn update_completed(&mut self, history_position: usize, status: StepStatus) {
        if let Some(record) = self
            .records
            .iter_mut()
            .find(|record| record.history_position == Some(history_position))
        {
            record.status = status;
            record.completed_at = Some(Instant::now());
        }
    }

    /// Get all records in the audit log.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Names of the steps with the given status, in the order they started.
    #[must_use]
    pub fn steps_with_status(&self, status: StepStatus) -> Vec<&str> {
        self.records
            .iter()
            .filter(|record| record.status == status)
            .map(|record| record.step.as_str())
            .collect()
    }

    /// Get a summary of the run for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                StepStatus::Executed => "✓",
                StepStatus::Failed => "✗",
                StepStatus::Compensated => "↩",
                StepStatus::CompensationFailed => "⚠",
            };
            match &record.redirected_to {
                Some(target) => lines.push(format!("{status} {} → {target}", record.step)),
                None => lines.push(format!("{status} {}", record.step)),
            }
        }
        lines.join("\n")
    }
}
