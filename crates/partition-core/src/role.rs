// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partition roles.

/// This replica's standing in the consensus group, as tracked by
/// [`PartitionContext::current_role`](crate::context::PartitionContext).
///
/// Narrower than [`ConsensusRole`]: the context only ever holds one of
/// these four values, even though consensus itself reports a wider set
/// of transient roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Inactive,
    Follower,
    Candidate,
    Leader,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Inactive => "inactive",
            Role::Follower => "follower",
            Role::Candidate => "candidate",
            Role::Leader => "leader",
        };
        write!(f, "{s}")
    }
}

/// The full set of roles a consensus role-change notification may carry.
///
/// `Passive` and `Promotable` exist only in consensus notifications; they
/// never appear in [`Role`] because the transition table collapses them
/// into a follower install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusRole {
    Leader,
    Follower,
    Candidate,
    Passive,
    Promotable,
    Inactive,
}

impl ConsensusRole {
    /// True for every role the transition table treats as "install the
    /// follower steps": follower, candidate, passive, promotable.
    pub fn is_follower_like(self) -> bool {
        matches!(
            self,
            ConsensusRole::Follower
                | ConsensusRole::Candidate
                | ConsensusRole::Passive
                | ConsensusRole::Promotable
        )
    }
}

impl std::fmt::Display for ConsensusRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConsensusRole::Leader => "leader",
            ConsensusRole::Follower => "follower",
            ConsensusRole::Candidate => "candidate",
            ConsensusRole::Passive => "passive",
            ConsensusRole::Promotable => "promotable",
            ConsensusRole::Inactive => "inactive",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
#[path = "role_tests.rs"]
mod tests;
