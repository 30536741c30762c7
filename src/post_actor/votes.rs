//! Vote state machine, shared by posts and comments.
//!
//! A voter is in one of three states for a post or comment: no vote, upvoted or downvoted. Repeating
//! the current direction is rejected; any other request moves to the requested direction
//! and yields the counter deltas that transition implies.

use crate::model::UserId;
use chrono::{DateTime, SubsecRound, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn from_upvote(is_upvote: bool) -> Self {
        if is_upvote {
            VoteDirection::Up
        } else {
            VoteDirection::Down
        }
    }

    /// Karma the post's author gains or loses for a vote in this direction.
    pub fn karma_delta(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

/// Counter changes caused by one accepted vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteDeltas {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VoteDeltas {
    pub fn karma(&self) -> i64 {
        self.upvotes - self.downvotes
    }
}

/// Returns the deltas for moving from `current` to `requested`, or `None` for a duplicate.
pub fn transition(current: Option<VoteDirection>, requested: VoteDirection) -> Option<VoteDeltas> {
    use VoteDirection::{Down, Up};

    let (upvotes, downvotes) = match (current, requested) {
        (None, Up) => (1, 0),
        (None, Down) => (0, 1),
        (Some(Down), Up) => (1, -1),
        (Some(Up), Down) => (-1, 1),
        (Some(Up), Up) | (Some(Down), Down) => return None,
    };
    Some(VoteDeltas { upvotes, downvotes })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteRecord {
    pub direction: VoteDirection,
    pub voted_at: DateTime<Utc>,
}

/// Every vote cast on one post or comment, by voter.
#[derive(Debug, Clone, Default)]
pub struct VoteLedger {
    votes: HashMap<UserId, VoteRecord>,
}

impl VoteLedger {
    pub fn direction_of(&self, voter: &UserId) -> Option<VoteDirection> {
        self.votes.get(voter).map(|record| record.direction)
    }

    /// Checks a vote against the ledger without recording it.
    pub fn plan(&self, voter: &UserId, requested: VoteDirection) -> Option<VoteDeltas> {
        transition(self.direction_of(voter), requested)
    }

    /// Records (or flips) the voter's vote.
    pub fn record(&mut self, voter: UserId, direction: VoteDirection) {
        self.votes.insert(
            voter,
            VoteRecord {
                direction,
                voted_at: Utc::now().trunc_subsecs(3),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
