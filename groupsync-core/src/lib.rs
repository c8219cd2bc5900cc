//! groupsync core library: domain types, the directory gateway seam, pair config, errors.
//!
//! - [`types`]: identifiers, identities, snapshots, direction
//! - [`gateway`]: [`DirectoryGateway`] and its outcomes
//! - [`pairs`]: load / save / list group pair configs
//! - [`error`]: [`ConfigError`], [`GatewayError`]

pub mod error;
pub mod gateway;
pub mod pairs;
pub mod types;

pub use error::{ConfigError, GatewayError};
pub use gateway::{AddOutcome, DirectoryGateway, IdentityResolver, RemoveOutcome, Resolution};
pub use pairs::{GroupPair, NewPair, PairName};
pub use types::{
    GroupRef, Identity, IdentityKey, MappingKey, MembershipSnapshot, Side, SyncDirection,
};
