//! # groupsync-directory
//!
//! File-backed directory backends implementing
//! [`DirectoryGateway`](groupsync_core::DirectoryGateway):
//! [`LocalDirectory`] for the on-prem side, [`RemoteDirectory`] for the cloud side.

pub mod local;
pub mod remote;
pub mod store;

pub use local::LocalDirectory;
pub use remote::RemoteDirectory;
pub use store::DirectoryDocument;
