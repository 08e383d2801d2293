//! Lead lifecycle: the stage machine for an active lead record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage of a lead in the pipeline.
///
/// Conversion to a project is an external event (the record file moves to
/// `projects/`), not a stage of this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStage {
    /// Initial evaluation of fit.
    Qualification,
    /// A proposal has been sent; waiting on the other side.
    ProposalSent,
    /// Terms are being negotiated.
    Negotiation,
    /// Conversation stalled; needs a nudge.
    NeedsFollowUp,
    /// Closed without conversion.
    ArchivedNoConversion,
}

impl LeadStage {
    /// Stages reachable from `self`.
    pub fn valid_transitions(&self) -> &[LeadStage] {
        match self {
            Self::Qualification => &[Self::ProposalSent, Self::ArchivedNoConversion],
            Self::ProposalSent => &[Self::Negotiation, Self::NeedsFollowUp, Self::ArchivedNoConversion],
            Self::Negotiation => &[Self::NeedsFollowUp, Self::ArchivedNoConversion],
            Self::NeedsFollowUp => &[Self::Negotiation, Self::ArchivedNoConversion],
            Self::ArchivedNoConversion => &[], // terminal
        }
    }

    /// Whether `target` is a legal successor.
    pub fn can_transition_to(&self, target: LeadStage) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// Whether this stage ends the lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ArchivedNoConversion)
    }

    /// The label written into the status block.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Qualification => "Qualification",
            Self::ProposalSent => "Proposal Sent",
            Self::Negotiation => "Negotiation",
            Self::NeedsFollowUp => "Needs Follow-Up",
            Self::ArchivedNoConversion => "Archived - No Conversion",
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
            "qualification" => Some(Self::Qualification),
            "proposalsent" => Some(Self::ProposalSent),
            "negotiation" => Some(Self::Negotiation),
            "needsfollowup" => Some(Self::NeedsFollowUp),
            "archivednoconversion" => Some(Self::ArchivedNoConversion),
            _ => None,
        }
    }
}

impl fmt::Display for LeadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_label_roundtrip() {
        for stage in [
            LeadStage::Qualification,
            LeadStage::ProposalSent,
            LeadStage::Negotiation,
            LeadStage::NeedsFollowUp,
            LeadStage::ArchivedNoConversion,
        ] {
            assert_eq!(LeadStage::from_label(stage.as_label()), Some(stage));
        }
    }

    #[test]
    fn stage_label_tolerates_case_and_punctuation() {
        assert_eq!(
            LeadStage::from_label("needs follow-up"),
            Some(LeadStage::NeedsFollowUp)
        );
        assert_eq!(
            LeadStage::from_label("ARCHIVED — no conversion"),
            Some(LeadStage::ArchivedNoConversion)
        );
        assert_eq!(LeadStage::from_label("converted"), None);
    }

    #[test]
    fn archived_is_terminal() {
        assert!(LeadStage::ArchivedNoConversion.is_terminal());
        assert!(LeadStage::ArchivedNoConversion.valid_transitions().is_empty());
        assert!(!LeadStage::Negotiation.is_terminal());
    }

    #[test]
    fn followup_and_negotiation_cycle() {
        assert!(LeadStage::Negotiation.can_transition_to(LeadStage::NeedsFollowUp));
        assert!(LeadStage::NeedsFollowUp.can_transition_to(LeadStage::Negotiation));
        // But no going back to qualification.
        assert!(!LeadStage::Negotiation.can_transition_to(LeadStage::Qualification));
    }
}
