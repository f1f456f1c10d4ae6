use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Votes keyed by an opaque vote key, as stored by the voting feature.
pub type Votes = HashMap<String, Vote>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "conferenceId")]
    pub conference_id: i64,
    #[serde(rename = "talkId")]
    pub talk_id: i64,
    #[serde(rename = "voteValue")]
    pub vote_value: i64,
    #[serde(default)]
    pub message: Option<String>,
}

impl Vote {
    pub fn vote_type(&self) -> Option<VoteType> {
        VoteType::from_value(self.vote_value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteType {
    Unlike,
    Neutral,
    Like,
}

impl VoteType {
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(VoteType::Unlike),
            1 => Some(VoteType::Neutral),
            2 => Some(VoteType::Like),
            _ => None,
        }
    }

    pub fn value(&self) -> i64 {
        match self {
            VoteType::Unlike => 0,
            VoteType::Neutral => 1,
            VoteType::Like => 2,
        }
    }
}

impl std::fmt::Display for VoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteType::Unlike => write!(f, "Unlike"),
            VoteType::Neutral => write!(f, "Neutral"),
            VoteType::Like => write!(f, "Like"),
        }
    }
}
