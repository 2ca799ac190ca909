/*!
 * Config scraping
 * Pulls declared subnets and in-use addresses out of wg-quick config text
 */

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::OnceLock;

use ipnet::IpNet;
use regex::Regex;

use crate::error::{Error, Result};
use crate::subnet::Subnet;

/// Facts scraped from an existing server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedConfig {
    /// Always an IPv4 network.
    pub ipv4: Subnet,
    /// Always an IPv6 network when present.
    pub ipv6: Option<Subnet>,
    /// Bare addresses of every `Address` and `AllowedIPs` entry.
    pub excluded: BTreeSet<IpAddr>,
}

fn address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?mi)^[ \t]*(#[ \t]*)?Address[ \t]*=[ \t]*(.+?)[ \t]*$").expect("valid pattern")
    })
}

fn allowed_ips_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?mi)^[ \t]*(#[ \t]*)?AllowedIPs[ \t]*=[ \t]*(.+?)[ \t]*$").expect("valid pattern")
    })
}

/// A single comma-separated value and whether its line was commented out.
struct Entry<'t> {
    commented: bool,
    value: &'t str,
}

/// All values following `re`'s key across the whole text, commented-out
/// lines included.
fn values<'t>(re: &'static Regex, text: &'t str) -> impl Iterator<Item = Entry<'t>> + 't {
    re.captures_iter(text).flat_map(|caps| {
        let commented = caps.get(1).is_some();
        let line = caps.get(2).map_or("", |m| m.as_str());
        line.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(move |value| Entry { commented, value })
    })
}

/// `10.0.0.1/24` and `10.0.0.1` both parse; anything else is skipped.
fn parse_net(value: &str) -> Option<IpNet> {
    value
        .parse::<IpNet>()
        .ok()
        .or_else(|| value.parse::<IpAddr>().ok().map(IpNet::from))
}

fn bare_address(value: &str) -> Option<IpAddr> {
    let ip = value.split_once('/').map_or(value, |(ip, _)| ip);
    ip.trim().parse().ok()
}

/// Scans config text for interface subnets and used addresses.
///
/// Matching is not section-scoped: every `Address` and `AllowedIPs` line in
/// the text contributes, and values that do not parse are ignored. Lines
/// commented out with `#` still reserve their addresses, so a disabled peer
/// keeps its IP, but never declare the interface subnet. Fails when no IPv4
/// interface address is declared.
pub fn scan(text: &str) -> Result<ScrapedConfig> {
    let mut excluded = BTreeSet::new();
    let mut ipv4 = None;
    let mut ipv6 = None;

    for entry in values(address_re(), text) {
        let Some(net) = parse_net(entry.value) else {
            continue;
        };
        excluded.insert(net.addr());
        if entry.commented {
            continue;
        }
        match Subnet::from(net) {
            subnet @ Subnet::V4(_) if ipv4.is_none() => ipv4 = Some(subnet),
            subnet @ Subnet::V6(_) if ipv6.is_none() => ipv6 = Some(subnet),
            _ => {}
        }
    }

    excluded.extend(values(allowed_ips_re(), text).filter_map(|entry| bare_address(entry.value)));

    let ipv4 = ipv4.ok_or_else(|| {
        Error::Config("Subnet not found in the configuration file.".into())
    })?;

    tracing::debug!(
        %ipv4,
        ipv6 = ?ipv6.map(|s| s.to_string()),
        excluded = excluded.len(),
        "scraped server config"
    );

    Ok(ScrapedConfig {
        ipv4,
        ipv6,
        excluded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn finds_subnet_and_exclusions() {
        let text = "[Interface]\nAddress = 10.0.0.1/24\nListenPort = 51820\n\n[Peer]\n# alice\nPublicKey = abc\nAllowedIPs = 10.0.0.5/32\n";
        let scraped = scan(text).unwrap();
        assert_eq!(scraped.ipv4.to_string(), "10.0.0.0/24");
        assert_eq!(scraped.ipv6, None);
        assert_eq!(scraped.excluded, [ip("10.0.0.1"), ip("10.0.0.5")].into());
    }

    #[test]
    fn dual_stack_address_line() {
        let text = "[Interface]\nAddress = 10.8.0.1/24, fd42:42:42::1/64\n\n[Peer]\nAllowedIPs = 10.8.0.2/32, fd42:42:42::2/128\n";
        let scraped = scan(text).unwrap();
        assert_eq!(scraped.ipv4.to_string(), "10.8.0.0/24");
        assert_eq!(scraped.ipv6.unwrap().to_string(), "fd42:42:42::/64");
        for addr in ["10.8.0.1", "10.8.0.2", "fd42:42:42::1", "fd42:42:42::2"] {
            assert!(scraped.excluded.contains(&ip(addr)), "{addr} missing");
        }
    }

    #[test]
    fn separate_address_lines_per_family() {
        let text = "[Interface]\nAddress = fd00::1/64\nAddress = 192.168.50.1/24\n";
        let scraped = scan(text).unwrap();
        assert_eq!(scraped.ipv4.to_string(), "192.168.50.0/24");
        assert_eq!(scraped.ipv6.unwrap().to_string(), "fd00::/64");
    }

    #[test]
    fn missing_address_is_config_error() {
        let text = "[Interface]\nListenPort = 51820\n\n[Peer]\nAllowedIPs = 10.0.0.2/32\n";
        assert!(matches!(scan(text), Err(Error::Config(_))));
        assert!(matches!(scan(""), Err(Error::Config(_))));
    }

    #[test]
    fn ipv6_only_is_config_error() {
        assert!(matches!(scan("Address = fd00::1/64\n"), Err(Error::Config(_))));
    }

    #[test]
    fn malformed_values_are_ignored() {
        let text = "Address = 10.0.0.1/24\nAllowedIPs = not-an-ip\nAllowedIPs=10.0.0.7/32\n";
        let scraped = scan(text).unwrap();
        assert_eq!(scraped.excluded, [ip("10.0.0.1"), ip("10.0.0.7")].into());
    }

    #[test]
    fn disabled_peer_keeps_its_address() {
        let text = "[Interface]\nAddress = 10.0.0.1/24\n\n#[Peer]\n#AllowedIPs = 10.0.0.2/32\n# AllowedIPs = 10.0.0.3/32, fd00::3/128\n";
        let scraped = scan(text).unwrap();
        for addr in ["10.0.0.2", "10.0.0.3", "fd00::3"] {
            assert!(scraped.excluded.contains(&ip(addr)), "{addr} missing");
        }
        assert_eq!(
            crate::allocate(scraped.ipv4, &scraped.excluded).unwrap(),
            ip("10.0.0.4")
        );
    }

    #[test]
    fn commented_address_never_declares_subnet() {
        let text = "# Address = 192.168.9.1/24\nAddress = 10.0.0.1/24\n#Address = fd00::1/64\n";
        let scraped = scan(text).unwrap();
        assert_eq!(scraped.ipv4.to_string(), "10.0.0.0/24");
        assert_eq!(scraped.ipv6, None);
        assert!(scraped.excluded.contains(&ip("192.168.9.1")));
        assert!(scraped.excluded.contains(&ip("fd00::1")));

        assert!(matches!(
            scan("#Address = 10.0.0.1/24\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn keys_are_matched_case_insensitively() {
        let scraped = scan("address = 10.3.0.1/16\nallowedips = 10.3.0.2/32\n").unwrap();
        assert_eq!(scraped.ipv4.to_string(), "10.3.0.0/16");
        assert!(scraped.excluded.contains(&ip("10.3.0.2")));
    }
}
