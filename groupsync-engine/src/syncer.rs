//! Applies a [`Delta`] to one directory, one member at a time.
//!
//! Additions are issued before any removal. A failing call is recorded
//! against that member and the batch carries on; [`apply`] itself never fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use groupsync_core::{
    AddOutcome, DirectoryGateway, GroupRef, IdentityKey, RemoveOutcome, Side, SyncDirection,
};

use crate::reconcile::{Delta, Unresolved};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberAction {
    Add,
    Remove,
}

/// Outcome of one gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MemberStatus {
    /// The directory changed.
    Applied,
    /// Already a member / already absent.
    Unchanged,
    Failed { cause: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberOutcome {
    pub key: IdentityKey,
    pub action: MemberAction,
    #[serde(flatten)]
    pub status: MemberStatus,
}

/// Everything one [`apply`] call did, member by member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub direction: SyncDirection,
    pub target: Side,
    pub group: GroupRef,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(default)]
    pub outcomes: Vec<MemberOutcome>,
    /// Carried over from the delta so operators can audit them.
    #[serde(default)]
    pub unresolved: Vec<Unresolved>,
}

impl SyncReport {
    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == MemberStatus::Applied)
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == MemberStatus::Unchanged)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MemberOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, MemberStatus::Failed { .. }))
    }

    /// No failed calls and nothing left unresolved.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none() && self.unresolved.is_empty()
    }
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

/// Apply `delta` to `group` in `target`.
///
/// `target` must be the directory on the delta's target side; only it is
/// mutated. Gateway errors are recorded per member, never returned.
pub fn apply<G>(delta: Delta, target: &mut G, group: &GroupRef) -> SyncReport
where
    G: DirectoryGateway + ?Sized,
{
    let started_at = Utc::now();
    let direction = delta.direction();
    let target_side = delta.target();
    let (to_add, to_remove, unresolved) = delta.into_parts();
    let mut outcomes = Vec::with_capacity(to_add.len() + to_remove.len());

    for identity in to_add {
        let status = match target.add_member(group, &identity.key) {
            Ok(AddOutcome::Added) => MemberStatus::Applied,
            Ok(AddOutcome::AlreadyMember) => MemberStatus::Unchanged,
            Err(err) => MemberStatus::Failed {
                cause: err.to_string(),
            },
        };
        outcomes.push(record(identity.key, MemberAction::Add, status, target_side, group));
    }

    for identity in to_remove {
        let status = match target.remove_member(group, &identity.key) {
            Ok(RemoveOutcome::Removed) => MemberStatus::Applied,
            Ok(RemoveOutcome::NotMember) => MemberStatus::Unchanged,
            Err(err) => MemberStatus::Failed {
                cause: err.to_string(),
            },
        };
        outcomes.push(record(identity.key, MemberAction::Remove, status, target_side, group));
    }

    let report = SyncReport {
        direction,
        target: target_side,
        group: group.clone(),
        started_at,
        finished_at: Utc::now(),
        outcomes,
        unresolved,
    };

    tracing::info!(
        %direction,
        %group,
        applied = report.applied(),
        unchanged = report.unchanged(),
        failed = report.failures().count(),
        unresolved = report.unresolved.len(),
        "applied membership delta"
    );
    report
}

fn record(
    key: IdentityKey,
    action: MemberAction,
    status: MemberStatus,
    side: Side,
    group: &GroupRef,
) -> MemberOutcome {
    match &status {
        MemberStatus::Failed { cause } => {
            tracing::warn!(%side, %group, member = %key, ?action, %cause, "member update failed");
        }
        _ => tracing::debug!(%side, %group, member = %key, ?action, ?status, "member update"),
    }
    MemberOutcome {
        key,
        action,
        status,
    }
}
