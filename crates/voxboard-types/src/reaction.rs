use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which side of a two-way reaction a subject picked: upvote/like is
/// `Positive`, downvote/dislike is `Negative`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn from_is_like(is_like: bool) -> Self {
        if is_like { Self::Positive } else { Self::Negative }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }
}

/// Feedback vote as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown vote type '{0}'")]
pub struct UnknownVoteType(pub String);

impl FromStr for VoteType {
    type Err = UnknownVoteType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(Self::Upvote),
            "downvote" => Ok(Self::Downvote),
            other => Err(UnknownVoteType(other.to_string())),
        }
    }
}

impl From<VoteType> for Polarity {
    fn from(vote: VoteType) -> Self {
        match vote {
            VoteType::Upvote => Self::Positive,
            VoteType::Downvote => Self::Negative,
        }
    }
}

impl From<Polarity> for VoteType {
    fn from(polarity: Polarity) -> Self {
        match polarity {
            Polarity::Positive => Self::Upvote,
            Polarity::Negative => Self::Downvote,
        }
    }
}

/// Anything a subject can react to. Each variant owns one counter pair and
/// one record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionTarget {
    Feedback(i64),
    Comment(i64),
    Reply(i64),
}

impl ReactionTarget {
    pub fn id(self) -> i64 {
        match self {
            Self::Feedback(id) | Self::Comment(id) | Self::Reply(id) => id,
        }
    }

    pub fn kind(self) -> &'static str {
        match self {
            Self::Feedback(_) => "feedback",
            Self::Comment(_) => "comment",
            Self::Reply(_) => "reply",
        }
    }
}

/// Denormalized aggregate pair (upvotes/downvotes or likes/dislikes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub positive: i64,
    pub negative: i64,
}

/// One step of the toggle state machine for a single (target, subject) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// NoReaction -> Reacted(to)
    Create { to: Polarity },
    /// Reacted(from) -> NoReaction, requested the same side again
    Remove { from: Polarity },
    /// Reacted(from) -> Reacted(to), requested the opposite side
    Switch { from: Polarity, to: Polarity },
}

impl Transition {
    pub fn plan(current: Option<Polarity>, requested: Polarity) -> Self {
        match current {
            None => Self::Create { to: requested },
            Some(from) if from == requested => Self::Remove { from },
            Some(from) => Self::Switch { from, to: requested },
        }
    }

    /// Counter deltas this step applies, in application order.
    pub fn deltas(self) -> Vec<(Polarity, i64)> {
        match self {
            Self::Create { to } => vec![(to, 1)],
            Self::Remove { from } => vec![(from, -1)],
            Self::Switch { from, to } => vec![(from, -1), (to, 1)],
        }
    }

    pub fn resulting(self) -> Option<Polarity> {
        match self {
            Self::Create { to } | Self::Switch { to, .. } => Some(to),
            Self::Remove { .. } => None,
        }
    }
}

/// Result of a committed toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub previous: Option<Polarity>,
    pub current: Option<Polarity>,
    pub counters: Counters,
}

#[cfg(test)]
mod tests {
    use super::*;

    use Polarity::{Negative, Positive};

    #[test]
    fn plan_covers_all_states() {
        assert_eq!(Transition::plan(None, Positive), Transition::Create { to: Positive });
        assert_eq!(
            Transition::plan(Some(Positive), Positive),
            Transition::Remove { from: Positive }
        );
        assert_eq!(
            Transition::plan(Some(Positive), Negative),
            Transition::Switch { from: Positive, to: Negative }
        );
    }

    #[test]
    fn deltas_net_to_reaction_count() {
        // Applying every step from every state keeps total reactions in {0, 1}.
        for current in [None, Some(Positive), Some(Negative)] {
            for requested in [Positive, Negative] {
                let step = Transition::plan(current, requested);
                let before = i64::from(current.is_some());
                let net: i64 = step.deltas().iter().map(|(_, d)| d).sum();
                let after = before + net;
                assert_eq!(after, i64::from(step.resulting().is_some()));
            }
        }
    }

    #[test]
    fn switch_decrements_old_side_first() {
        let step = Transition::plan(Some(Negative), Positive);
        assert_eq!(step.deltas(), vec![(Negative, -1), (Positive, 1)]);
        assert_eq!(step.resulting(), Some(Positive));
    }

    #[test]
    fn vote_type_wire_format() {
        let vote: VoteType = serde_json::from_str("\"upvote\"").unwrap();
        assert_eq!(Polarity::from(vote), Positive);
        assert!(serde_json::from_str::<VoteType>("\"sideways\"").is_err());
    }
}
