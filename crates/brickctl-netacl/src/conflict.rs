//! Cross-list conflict validation
//!
//! Read-only and read/write access lists must be mutually exclusive: no
//! client may appear in both, directly or through a network it belongs to.

use tracing::debug;

use crate::error::NetAclError;
use crate::list::AddressList;

/// Checks two access lists for overlapping clients
pub struct ConflictValidator;

impl ConflictValidator {
    /// Fails on the first conflict found between `read_only` and
    /// `read_write`
    ///
    /// Checks run in this order:
    /// 1. the same host in both lists
    /// 2. overlapping networks
    /// 3. a host in one list inside a network of the other
    /// 4. the same name in both lists
    ///
    /// # Errors
    /// Returns `InvalidAddressSpecification` naming the offending address,
    /// network or name.
    pub fn validate(read_only: &AddressList, read_write: &AddressList) -> Result<(), NetAclError> {
        let conflict = |message: String| {
            debug!(%message, "Access list conflict");
            Err(NetAclError::InvalidAddressSpecification(message))
        };

        for ro_host in read_only.hosts() {
            if read_write.hosts().contains(ro_host) {
                return conflict(format!(
                    "Found host address {ro_host} in read/write and read-only lists"
                ));
            }
        }

        for ro_net in read_only.nets() {
            for rw_net in read_write.nets() {
                if ro_net.contains(rw_net.network()) || rw_net.contains(ro_net.network()) {
                    return conflict(format!(
                        "Found network address {ro_net} in read/write and read-only lists"
                    ));
                }
            }
        }

        for ro_host in read_only.hosts() {
            if let Some(rw_net) = read_write.nets().iter().find(|n| n.contains(*ro_host)) {
                return conflict(format!(
                    "Found host address {ro_host} in read-only list belonging to network address {rw_net} in read/write list"
                ));
            }
        }
        for rw_host in read_write.hosts() {
            if let Some(ro_net) = read_only.nets().iter().find(|n| n.contains(*rw_host)) {
                return conflict(format!(
                    "Found host address {rw_host} in read/write list belonging to network address {ro_net} in read-only list"
                ));
            }
        }

        for name in read_only.others() {
            if read_write.others().contains(name) {
                return conflict(format!(
                    "Found name {name} in read-only and read/write lists"
                ));
            }
        }

        Ok(())
    }
}
