//! Membership diffing between the two directories.
//!
//! Reconciliation runs in two phases:
//!
//! 1. [`plan`]: pure. Validates both snapshots, joins them on correlation
//!    keys and decides which source entries are missing from the target and
//!    which target entries have no source counterpart.
//! 2. [`resolve`]: looks each missing source entry up in the target
//!    directory so that every addition is expressed as a target-native record.
//!
//! Records without a correlation value never take part in either list.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use groupsync_core::{
    Identity, IdentityKey, IdentityResolver, MappingKey, MembershipSnapshot, Resolution, Side,
    SyncDirection,
};

use crate::error::{ContractError, ResolutionError};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A source entry whose target-native record could not be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unresolved {
    pub mapping: MappingKey,
    /// Native key of the entry in the source directory.
    pub source_key: IdentityKey,
    pub cause: ResolutionError,
}

/// The changes that make the target group match the source of truth.
///
/// Built once per reconciliation and consumed by [`apply`](crate::syncer::apply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delta {
    direction: SyncDirection,
    to_add: Vec<Identity>,
    to_remove: Vec<Identity>,
    unresolved: Vec<Unresolved>,
}

impl Delta {
    pub fn direction(&self) -> SyncDirection {
        self.direction
    }

    /// The directory this delta must be applied to.
    pub fn target(&self) -> Side {
        self.direction.target()
    }

    /// Target-native records to add, in source snapshot order.
    pub fn to_add(&self) -> &[Identity] {
        &self.to_add
    }

    /// Target records to remove, in target snapshot order.
    pub fn to_remove(&self) -> &[Identity] {
        &self.to_remove
    }

    pub fn unresolved(&self) -> &[Unresolved] {
        &self.unresolved
    }

    /// True when the target already matches (unresolved entries aside).
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<Identity>, Vec<Identity>, Vec<Unresolved>) {
        (self.to_add, self.to_remove, self.unresolved)
    }
}

/// A source entry missing from the target, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAdd {
    pub mapping: MappingKey,
    pub source: Identity,
}

/// Output of the pure planning phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub direction: SyncDirection,
    pub to_add: Vec<PlannedAdd>,
    pub to_remove: Vec<Identity>,
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Compute which correlation keys must be added to and removed from the target.
///
/// `local` and `remote` must be tagged with their own side; the direction
/// picks which of the two is authoritative.
pub fn plan(
    local: &MembershipSnapshot,
    remote: &MembershipSnapshot,
    direction: SyncDirection,
) -> Result<Plan, ContractError> {
    expect_side(local, Side::Local)?;
    expect_side(remote, Side::Remote)?;

    let local_index = correlation_index(local)?;
    let remote_index = correlation_index(remote)?;

    let ((source, source_index), (target, target_index)) = match direction {
        SyncDirection::ToRemote => ((local, local_index), (remote, remote_index)),
        SyncDirection::ToLocal => ((remote, remote_index), (local, local_index)),
    };

    let to_add: Vec<PlannedAdd> = source
        .mapped()
        .filter(|(mapping, _)| !target_index.contains(mapping))
        .map(|(mapping, identity)| PlannedAdd {
            mapping,
            source: identity.clone(),
        })
        .collect();

    let to_remove: Vec<Identity> = target
        .mapped()
        .filter(|(mapping, _)| !source_index.contains(mapping))
        .map(|(_, identity)| identity.clone())
        .collect();

    tracing::debug!(
        %direction,
        source = source.len(),
        target = target.len(),
        add = to_add.len(),
        remove = to_remove.len(),
        "planned membership delta"
    );

    Ok(Plan {
        direction,
        to_add,
        to_remove,
    })
}

/// Turn a plan into a [`Delta`] by resolving every addition against the
/// target directory.
///
/// Lookups that find nothing, or fail, land in [`Delta::unresolved`]. A key
/// matching several records aborts with [`ContractError::AmbiguousResolution`].
pub fn resolve<R>(plan: Plan, target: &R) -> Result<Delta, ContractError>
where
    R: IdentityResolver + ?Sized,
{
    let target_side = plan.direction.target();
    let mut to_add = Vec::with_capacity(plan.to_add.len());
    let mut unresolved = Vec::new();

    for PlannedAdd { mapping, source } in plan.to_add {
        let cause = match target.resolve_identity(&mapping) {
            Ok(Resolution::Found(identity)) => {
                to_add.push(identity);
                continue;
            }
            Ok(Resolution::Ambiguous(candidates)) => {
                return Err(ContractError::AmbiguousResolution {
                    side: target_side,
                    mapping,
                    candidates,
                });
            }
            Ok(Resolution::NotFound) => ResolutionError::NotFound,
            Err(err) => ResolutionError::Gateway(err.to_string()),
        };
        tracing::warn!(
            %mapping,
            source = %source.key,
            target = %target_side,
            %cause,
            "could not resolve identity in target directory"
        );
        unresolved.push(Unresolved {
            mapping,
            source_key: source.key,
            cause,
        });
    }

    Ok(Delta {
        direction: plan.direction,
        to_add,
        to_remove: plan.to_remove,
        unresolved,
    })
}

/// Plan and resolve in one call.
///
/// `target` must be the directory on the side `direction` points at.
pub fn reconcile<R>(
    local: &MembershipSnapshot,
    remote: &MembershipSnapshot,
    direction: SyncDirection,
    target: &R,
) -> Result<Delta, ContractError>
where
    R: IdentityResolver + ?Sized,
{
    resolve(plan(local, remote, direction)?, target)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn expect_side(snapshot: &MembershipSnapshot, expected: Side) -> Result<(), ContractError> {
    if snapshot.side != expected {
        return Err(ContractError::WrongSide {
            expected,
            actual: snapshot.side,
        });
    }
    Ok(())
}

/// Validate a snapshot and collect its correlation keys.
fn correlation_index(snapshot: &MembershipSnapshot) -> Result<HashSet<MappingKey>, ContractError> {
    let side = snapshot.side;
    let mut keys: HashSet<&IdentityKey> = HashSet::with_capacity(snapshot.len());
    let mut mappings: HashMap<MappingKey, &IdentityKey> = HashMap::with_capacity(snapshot.len());

    for (position, member) in snapshot.members.iter().enumerate() {
        if member.key.0.trim().is_empty() {
            return Err(ContractError::MissingKey { side, position });
        }
        if !keys.insert(&member.key) {
            return Err(ContractError::DuplicateKey {
                side,
                key: member.key.clone(),
            });
        }
        let Some(mapping) = member.correlation_key(side) else {
            if side == Side::Remote {
                return Err(ContractError::MissingRemoteKey {
                    key: member.key.clone(),
                });
            }
            continue;
        };
        if let Some(first) = mappings.get(&mapping) {
            return Err(ContractError::DuplicateMapping {
                side,
                mapping,
                first: (*first).clone(),
                second: member.key.clone(),
            });
        }
        mappings.insert(mapping, &member.key);
    }

    Ok(mappings.into_keys().collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
