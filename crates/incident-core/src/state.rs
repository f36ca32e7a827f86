//! Run lifecycle.
//!
//! ```text
//! Analyzing -> Mapping -> Processing -> Finished(outcome) -> Recorded(outcome)
//!                 ^  |
//!                 +--+  (rules may be edited any number of times)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use incident_model::ProcessingResult;

/// Classification of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every row was stored.
    Success,
    /// Some rows were skipped or reported.
    Partial,
    /// Nothing was stored because the run itself failed.
    Failed,
}

impl RunOutcome {
    pub fn classify(result: &ProcessingResult) -> Self {
        let run_failed = result.errors.iter().any(|issue| !issue.is_row_scoped());
        if result.inserted_rows() == 0 && run_failed {
            Self::Failed
        } else if result.skipped_rows == 0 && result.errors.is_empty() {
            Self::Success
        } else {
            Self::Partial
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "outcome", rename_all = "snake_case")]
pub enum RunState {
    Analyzing,
    Mapping,
    Processing,
    Finished(RunOutcome),
    Recorded(RunOutcome),
}

impl RunState {
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState as S;
        match (self, next) {
            (S::Analyzing, S::Mapping)
            | (S::Mapping, S::Mapping | S::Processing)
            | (S::Processing, S::Finished(_)) => true,
            (S::Finished(done), S::Recorded(recorded)) => done == recorded,
            _ => false,
        }
    }

    pub fn outcome(self) -> Option<RunOutcome> {
        match self {
            Self::Finished(outcome) | Self::Recorded(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analyzing => f.write_str("analyzing"),
            Self::Mapping => f.write_str("mapping"),
            Self::Processing => f.write_str("processing"),
            Self::Finished(outcome) => write!(f, "{outcome}"),
            Self::Recorded(outcome) => write!(f, "recorded ({outcome})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use incident_model::{ProcessingIssue, TargetField};

    use super::*;

    fn nothing_stored(skipped: usize, errors: Vec<ProcessingIssue>) -> ProcessingResult {
        ProcessingResult {
            success: false,
            processed_rows: 0,
            errors,
            warnings: Vec::new(),
            inserted_data: Vec::new(),
            skipped_rows: skipped,
        }
    }

    #[test]
    fn transitions_follow_the_lifecycle() {
        assert!(RunState::Analyzing.can_transition_to(RunState::Mapping));
        assert!(RunState::Mapping.can_transition_to(RunState::Mapping));
        assert!(RunState::Processing.can_transition_to(RunState::Finished(RunOutcome::Failed)));
        assert!(
            RunState::Finished(RunOutcome::Partial)
                .can_transition_to(RunState::Recorded(RunOutcome::Partial))
        );
        assert!(!RunState::Analyzing.can_transition_to(RunState::Processing));
        assert!(
            !RunState::Finished(RunOutcome::Partial)
                .can_transition_to(RunState::Recorded(RunOutcome::Success))
        );
        assert!(RunState::Recorded(RunOutcome::Success).is_terminal());
    }

    #[test]
    fn aborted_runs_are_failed() {
        let abort = ProcessingIssue::StructuralAbort {
            missing: vec![TargetField::Location],
        };
        assert_eq!(
            RunOutcome::classify(&nothing_stored(4, vec![abort])),
            RunOutcome::Failed
        );
        assert_eq!(
            RunOutcome::classify(&nothing_stored(0, Vec::new())),
            RunOutcome::Success
        );
        assert_eq!(
            RunOutcome::classify(&nothing_stored(2, Vec::new())),
            RunOutcome::Partial
        );
    }
}
