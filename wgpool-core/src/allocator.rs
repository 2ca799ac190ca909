/*!
 * Address allocation
 * Lowest-free-host selection over a subnet and an exclusion set
 */

use std::collections::BTreeSet;
use std::net::IpAddr;

use crate::error::{Error, Result};
use crate::subnet::Subnet;

/// A subnet together with the addresses that are already taken.
///
/// Allocation never mutates the pool. The caller persists the chosen address
/// into the config text, which excludes it on the next scrape.
#[derive(Debug, Clone)]
pub struct AddressPool<'a> {
    subnet: Subnet,
    excluded: &'a BTreeSet<IpAddr>,
}

impl<'a> AddressPool<'a> {
    pub fn new(subnet: Subnet, excluded: &'a BTreeSet<IpAddr>) -> Self {
        Self { subnet, excluded }
    }

    pub fn allocate(&self) -> Result<IpAddr> {
        allocate(self.subnet, self.excluded)
    }
}

/// Returns the lowest host of `subnet` not present in `excluded`.
pub fn allocate(subnet: Subnet, excluded: &BTreeSet<IpAddr>) -> Result<IpAddr> {
    subnet
        .hosts()
        .find(|ip| !excluded.contains(ip))
        .ok_or_else(|| Error::PoolExhausted {
            subnet: subnet.to_string(),
        })
}
