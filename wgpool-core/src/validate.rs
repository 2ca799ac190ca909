/*!
 * Input validation
 * Sanity checks on operator-supplied values before anything is written
 */

use crate::error::{Error, Result};
use crate::subnet::Subnet;

/// Textual length of a base64 WireGuard key.
pub const WG_KEY_LEN: usize = 44;

pub fn ipv4_subnet(value: &str) -> Result<Subnet> {
    let subnet = Subnet::parse(value)?;
    if !subnet.is_ipv4() {
        return Err(Error::Validation(format!(
            "Invalid subnet provided: {value} is not an IPv4 network"
        )));
    }
    Ok(subnet)
}

pub fn ipv6_subnet(value: &str) -> Result<Subnet> {
    let subnet = Subnet::parse(value)?;
    if subnet.is_ipv4() {
        return Err(Error::Validation(format!(
            "Invalid subnet provided: {value} is not an IPv6 network"
        )));
    }
    Ok(subnet)
}

/// Accepts 1 through 65535.
pub fn listen_port(port: u32) -> Result<u16> {
    u16::try_from(port)
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| {
            Error::Validation("Invalid listen port provided. Must be between 1 and 65535.".into())
        })
}

/// Length check only; the key material itself is never inspected.
pub fn key(kind: &str, value: &str) -> Result<()> {
    let len = value.chars().count();
    if len != WG_KEY_LEN {
        return Err(Error::Validation(format!(
            "Invalid {kind} provided. Expected {WG_KEY_LEN} characters, got {len}."
        )));
    }
    Ok(())
}

/// The username lands in a `#` comment line, so it must stay on one line.
pub fn username(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation("Username is required".into()));
    }
    if value.contains(['\n', '\r']) {
        return Err(Error::Validation("Username cannot span multiple lines".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=";

    #[test]
    fn port_bounds() {
        assert!(listen_port(0).is_err());
        assert_eq!(listen_port(1).unwrap(), 1);
        assert_eq!(listen_port(51820).unwrap(), 51820);
        assert_eq!(listen_port(65535).unwrap(), 65535);
        assert!(listen_port(65536).is_err());
    }

    #[test]
    fn key_length() {
        assert_eq!(KEY.len(), WG_KEY_LEN);
        assert!(key("private key", KEY).is_ok());
        assert!(key("private key", &KEY[1..]).is_err());
        assert!(key("private key", "").is_err());
    }

    #[test]
    fn key_length_counts_characters() {
        let wide = "é".repeat(WG_KEY_LEN);
        assert_eq!(wide.len(), 2 * WG_KEY_LEN);
        assert!(key("public key", &wide).is_ok());
        assert!(key("public key", &"é".repeat(WG_KEY_LEN / 2)).is_err());
    }

    #[test]
    fn subnet_families() {
        assert!(ipv4_subnet("10.0.0.0/24").is_ok());
        assert!(ipv4_subnet("fd00::/64").is_err());
        assert!(ipv6_subnet("fd00::/64").is_ok());
        assert!(ipv6_subnet("10.0.0.0/24").is_err());
        assert!(ipv4_subnet("nonsense").is_err());
    }

    #[test]
    fn usernames() {
        assert!(username("alice").is_ok());
        assert!(username("Alice's laptop").is_ok());
        assert!(username("  ").is_err());
        assert!(username("bob\n[Peer]").is_err());
    }
}
