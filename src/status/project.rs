//! Project lifecycle: the state machine for a project record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectState {
    /// Scoped but not started.
    Planning,
    /// Actively being worked.
    InProgress,
    /// Paused by us.
    OnHold,
    /// Waiting on the client/stakeholder.
    AwaitingFeedback,
    /// Stuck on an external dependency.
    Blocked,
    /// Delivered.
    Done,
}

impl ProjectState {
    /// States reachable from `self`.
    pub fn valid_transitions(&self) -> &[ProjectState] {
        match self {
            Self::Planning => &[Self::InProgress],
            Self::InProgress => &[
                Self::OnHold,
                Self::AwaitingFeedback,
                Self::Blocked,
                Self::Done,
            ],
            Self::OnHold => &[Self::InProgress, Self::Done],
            Self::AwaitingFeedback => &[Self::InProgress, Self::Done],
            Self::Blocked => &[Self::InProgress, Self::Done],
            Self::Done => &[], // terminal
        }
    }

    /// Whether `target` is a legal successor.
    pub fn can_transition_to(&self, target: ProjectState) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// Whether this state ends the lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The label written into the status block.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Planning => "Planning",
            Self::InProgress => "In Progress",
            Self::OnHold => "On Hold",
            Self::AwaitingFeedback => "Awaiting Feedback",
            Self::Blocked => "Blocked",
            Self::Done => "Done",
        }
    }

    /// Parse from a status-block label (case-insensitive, punctuation-tolerant).
    pub fn from_label(s: &str) -> Option<Self> {
        let norm: String = s
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match norm.as_str() {
            "planning" => Some(Self::Planning),
            "inprogress" => Some(Self::InProgress),
            "onhold" => Some(Self::OnHold),
            "awaitingfeedback" => Some(Self::AwaitingFeedback),
            "blocked" => Some(Self::Blocked),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
