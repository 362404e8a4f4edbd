//! brickctl NetACL - Network access lists and share descriptors
//!
//! Provides:
//! - Classification of access-list tokens into hosts, networks and names
//! - Colon-separated access lists with canonical `@`-prefixed serialization
//! - Conflict validation between read-only and read/write lists
//! - NFS and SMB share descriptors that render `sharenfs` / `sharesmb`
//!   values and convert into share overlays for reconciliation

pub mod address;
pub mod conflict;
pub mod error;
pub mod list;
pub mod nfs;
mod params;
pub mod smb;

pub use address::{AddressEntry, NUMERIC_PREFIX};
pub use conflict::ConflictValidator;
pub use error::NetAclError;
pub use list::AddressList;
pub use nfs::{NfsShare, NfsShareBuilder};
pub use smb::{SmbShare, SmbShareBuilder};
