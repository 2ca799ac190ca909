/*!
 * Subnets
 * CIDR networks of either family with ordered host enumeration
 */

use std::fmt;
use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

use crate::error::{Error, Result};

/// A CIDR network, always stored truncated to its network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subnet {
    V4(Ipv4Net),
    V6(Ipv6Net),
}

impl Subnet {
    /// Parses `addr/len`, accepting host bits (`10.0.0.7/24` is `10.0.0.0/24`).
    pub fn parse(value: &str) -> Result<Self> {
        let net: IpNet = value
            .trim()
            .parse()
            .map_err(|_| Error::Validation(format!("Invalid subnet provided: {value}")))?;
        Ok(Self::from(net))
    }

    pub fn prefix_len(&self) -> u8 {
        match self {
            Self::V4(net) => net.prefix_len(),
            Self::V6(net) => net.prefix_len(),
        }
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self, Self::V4(_))
    }

    /// Usable host addresses, lowest first.
    ///
    /// IPv4 drops the network and broadcast addresses below /31. IPv6 drops
    /// the Subnet-Router anycast address below /127 and has no broadcast.
    pub fn hosts(&self) -> Box<dyn Iterator<Item = IpAddr>> {
        match *self {
            Self::V4(net) => Box::new(net.hosts().map(IpAddr::V4)),
            Self::V6(net) => {
                let skip = usize::from(net.prefix_len() < 127);
                Box::new(net.hosts().skip(skip).map(IpAddr::V6))
            }
        }
    }
}

impl From<IpNet> for Subnet {
    fn from(net: IpNet) -> Self {
        match net.trunc() {
            IpNet::V4(v4) => Self::V4(v4),
            IpNet::V6(v6) => Self::V6(v6),
        }
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4(net) => fmt::Display::fmt(net, f),
            Self::V6(net) => fmt::Display::fmt(net, f),
        }
    }
}
