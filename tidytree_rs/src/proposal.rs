//! Proposal value types.
//!
//! A Move always carries a target; a Flag or Delete never does. The two
//! shapes are separate types so the rule holds by construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Open key/value detail map attached to a proposal.
pub type Details = BTreeMap<String, Value>;

/// Risk level for a proposed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low risk: tests, docs, data, plain modules
    Low,
    /// Medium risk: executables and configuration
    Medium,
    /// High risk: heavily coupled modules, critical manifests
    High,
}

impl RiskLevel {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Case-insensitive parse of the serialized form.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

/// Action kind, as reported to users and written to the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Move,
    Flag,
    Delete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Move => "move",
            ActionKind::Flag => "flag",
            ActionKind::Delete => "delete",
        }
    }
}

/// What raised an advisory proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Classifier gave up; a human has to look.
    NeedsReview,
    /// Several files share a case-insensitive name.
    DuplicateName,
    /// Source file sitting at the repository root.
    RootLevel,
}

impl Signal {
    /// Low-signal notes that add nothing when a move is already proposed.
    pub fn is_informational(&self) -> bool {
        matches!(self, Signal::RootLevel)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveProposal {
    pub source: String,
    pub target: String,
    pub reason: String,
    pub risk: RiskLevel,
    pub details: Details,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdvisoryKind {
    Flag,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryProposal {
    pub kind: AdvisoryKind,
    pub signal: Signal,
    pub source: String,
    pub reason: String,
    pub risk: RiskLevel,
    pub details: Details,
}

/// One suggested structural change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposal {
    Move(MoveProposal),
    Advisory(AdvisoryProposal),
}

impl Proposal {
    pub fn move_to(
        source: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
        risk: RiskLevel,
        details: Details,
    ) -> Self {
        Proposal::Move(MoveProposal {
            source: source.into(),
            target: target.into(),
            reason: reason.into(),
            risk,
            details,
        })
    }

    pub fn flag(
        signal: Signal,
        source: impl Into<String>,
        reason: impl Into<String>,
        risk: RiskLevel,
        details: Details,
    ) -> Self {
        Proposal::Advisory(AdvisoryProposal {
            kind: AdvisoryKind::Flag,
            signal,
            source: source.into(),
            reason: reason.into(),
            risk,
            details,
        })
    }

    pub fn action(&self) -> ActionKind {
        match self {
            Proposal::Move(_) => ActionKind::Move,
            Proposal::Advisory(a) => match a.kind {
                AdvisoryKind::Flag => ActionKind::Flag,
                AdvisoryKind::Delete => ActionKind::Delete,
            },
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Proposal::Move(m) => &m.source,
            Proposal::Advisory(a) => &a.source,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Proposal::Move(m) => Some(&m.target),
            Proposal::Advisory(_) => None,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Proposal::Move(m) => &m.reason,
            Proposal::Advisory(a) => &a.reason,
        }
    }

    pub fn risk(&self) -> RiskLevel {
        match self {
            Proposal::Move(m) => m.risk,
            Proposal::Advisory(a) => a.risk,
        }
    }

    pub fn details(&self) -> &Details {
        match self {
            Proposal::Move(m) => &m.details,
            Proposal::Advisory(a) => &a.details,
        }
    }

    pub fn as_move(&self) -> Option<&MoveProposal> {
        match self {
            Proposal::Move(m) => Some(m),
            Proposal::Advisory(_) => None,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Proposal::Move(_))
    }

    pub fn signal(&self) -> Option<Signal> {
        match self {
            Proposal::Move(_) => None,
            Proposal::Advisory(a) => Some(a.signal),
        }
    }

    pub fn is_duplicate_flag(&self) -> bool {
        self.signal() == Some(Signal::DuplicateName)
    }
}

#[derive(Serialize)]
struct ProposalRecord<'a> {
    action: ActionKind,
    source: &'a str,
    target: Option<&'a str>,
    reason: &'a str,
    risk: RiskLevel,
    details: &'a Details,
}

impl Serialize for Proposal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ProposalRecord {
            action: self.action(),
            source: self.source(),
            target: self.target(),
            reason: self.reason(),
            risk: self.risk(),
            details: self.details(),
        }
        .serialize(serializer)
    }
}

/// Counts of moves by risk.
pub fn count_moves_by_risk(proposals: &[Proposal]) -> BTreeMap<RiskLevel, usize> {
    let mut counts = BTreeMap::new();
    for p in proposals.iter().filter(|p| p.is_move()) {
        *counts.entry(p.risk()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_always_has_target_and_flag_never() {
        let mv = Proposal::move_to("a.py", "src/a.py", "r", RiskLevel::Low, Details::new());
        let fl = Proposal::flag(Signal::NeedsReview, "b.bin", "r", RiskLevel::Low, Details::new());
        assert_eq!(mv.action(), ActionKind::Move);
        assert_eq!(mv.target(), Some("src/a.py"));
        assert_eq!(fl.action(), ActionKind::Flag);
        assert_eq!(fl.target(), None);
    }

    #[test]
    fn serializes_flat_record() {
        let mut details = Details::new();
        details.insert("category".into(), Value::from("src"));
        let mv = Proposal::move_to("a.py", "src/a.py", "why", RiskLevel::Medium, details);
        let json = serde_json::to_value(&mv).expect("serialize");
        assert_eq!(json["action"], "move");
        assert_eq!(json["target"], "src/a.py");
        assert_eq!(json["risk"], "medium");
        assert_eq!(json["details"]["category"], "src");

        let fl = Proposal::flag(Signal::RootLevel, "x.py", "why", RiskLevel::Low, Details::new());
        let json = serde_json::to_value(&fl).expect("serialize");
        assert_eq!(json["action"], "flag");
        assert!(json["target"].is_null());
    }

    #[test]
    fn risk_ordering_and_parse() {
        assert!(RiskLevel::Low < RiskLevel::Medium && RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::parse("HIGH"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::parse("extreme"), None);
    }

    #[test]
    fn only_root_level_is_informational() {
        assert!(Signal::RootLevel.is_informational());
        assert!(!Signal::DuplicateName.is_informational());
        assert!(!Signal::NeedsReview.is_informational());
    }
}
