/*!
 * Config rendering
 * wg-quick text for the server interface, peer stanzas and client configs
 */

use std::fmt::Display;
use std::fmt::Write as _;
use std::net::IpAddr;

use crate::subnet::Subnet;

/// Written in place of a private key the operator kept to themselves.
pub const PRIVATE_KEY_PLACEHOLDER: &str = "[your private key]";

/// Optional wg-quick hook commands, passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirewallHooks {
    pub pre_up: Option<String>,
    pub post_up: Option<String>,
    pub pre_down: Option<String>,
    pub post_down: Option<String>,
}

impl FirewallHooks {
    /// Forwarding plus NAT masquerading out of `egress`.
    pub fn masquerade(egress: &str) -> Self {
        let rules = |op: char| {
            format!(
                "iptables -{op} FORWARD -i %i -j ACCEPT; iptables -{op} FORWARD -o %i -j ACCEPT; iptables -t nat -{op} POSTROUTING -o {egress} -j MASQUERADE"
            )
        };
        Self {
            post_up: Some(rules('A')),
            post_down: Some(rules('D')),
            ..Default::default()
        }
    }

    /// Fills any hook left empty in `self` from `other`.
    pub fn or(self, other: Self) -> Self {
        Self {
            pre_up: self.pre_up.or(other.pre_up),
            post_up: self.post_up.or(other.post_up),
            pre_down: self.pre_down.or(other.pre_down),
            post_down: self.post_down.or(other.post_down),
        }
    }
}

/// Interface address with its prefix, e.g. `10.0.0.1/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub ip: IpAddr,
    pub prefix_len: u8,
}

impl Display for InterfaceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix_len)
    }
}

/// The server's `[Interface]` as created by server-init.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerProfile {
    pub ipv4: InterfaceAddress,
    pub ipv6: Option<InterfaceAddress>,
    pub listen_port: u16,
    pub private_key: String,
    pub hooks: FirewallHooks,
}

/// A provisioned client as recorded in the server config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    pub username: String,
    pub public_key: String,
    pub ipv4: IpAddr,
    pub ipv6: Option<IpAddr>,
}

/// Everything the client side of a new peer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProfile<'a> {
    pub ipv4: IpAddr,
    pub ipv6: Option<IpAddr>,
    /// `None` renders [`PRIVATE_KEY_PLACEHOLDER`].
    pub private_key: Option<&'a str>,
    pub server_public_key: &'a str,
    pub endpoint: &'a str,
    pub dns: &'a str,
    pub allowed_ips: &'a str,
    pub persistent_keepalive: u32,
}

impl InterfaceAddress {
    pub fn in_subnet(ip: IpAddr, subnet: Subnet) -> Self {
        Self {
            ip,
            prefix_len: subnet.prefix_len(),
        }
    }
}

fn push_kv_line(content: &mut String, key: &str, value: impl Display) {
    let _ = writeln!(content, "{key} = {value}");
}

/// `v4/32` or `v4/32, v6/128`.
fn host_routes(ipv4: IpAddr, ipv6: Option<IpAddr>) -> String {
    match ipv6 {
        Some(v6) => format!("{ipv4}/32, {v6}/128"),
        None => format!("{ipv4}/32"),
    }
}

pub fn render_server(profile: &ServerProfile) -> String {
    let address = match profile.ipv6 {
        Some(v6) => format!("{}, {v6}", profile.ipv4),
        None => profile.ipv4.to_string(),
    };

    let mut content = String::new();
    content.push_str("[Interface]\n");
    push_kv_line(&mut content, "Address", address);
    push_kv_line(&mut content, "ListenPort", profile.listen_port);
    push_kv_line(&mut content, "PrivateKey", &profile.private_key);

    let hooks = &profile.hooks;
    for (key, cmd) in [
        ("PreUp", &hooks.pre_up),
        ("PostUp", &hooks.post_up),
        ("PreDown", &hooks.pre_down),
        ("PostDown", &hooks.post_down),
    ] {
        if let Some(cmd) = cmd {
            push_kv_line(&mut content, key, cmd);
        }
    }
    content
}

/// Stanza appended to the server config; starts with a blank separator line.
pub fn render_peer_stanza(peer: &PeerRecord) -> String {
    let mut content = String::new();
    content.push_str("\n[Peer]\n");
    let _ = writeln!(content, "# {}", peer.username);
    push_kv_line(&mut content, "PublicKey", &peer.public_key);
    push_kv_line(&mut content, "AllowedIPs", host_routes(peer.ipv4, peer.ipv6));
    content
}

pub fn render_client_config(client: &ClientProfile<'_>) -> String {
    let mut content = String::new();
    content.push_str("[Interface]\n");
    push_kv_line(
        &mut content,
        "PrivateKey",
        client.private_key.unwrap_or(PRIVATE_KEY_PLACEHOLDER),
    );
    push_kv_line(&mut content, "Address", host_routes(client.ipv4, client.ipv6));
    let _ = writeln!(content, "# DNS = {}", client.dns);
    content.push('\n');
    content.push_str("[Peer]\n");
    push_kv_line(&mut content, "PublicKey", client.server_public_key);
    push_kv_line(&mut content, "Endpoint", client.endpoint);
    push_kv_line(&mut content, "AllowedIPs", client.allowed_ips);
    push_kv_line(&mut content, "PersistentKeepalive", client.persistent_keepalive);
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=";

    fn server(ipv6: Option<InterfaceAddress>) -> ServerProfile {
        ServerProfile {
            ipv4: InterfaceAddress {
                ip: "10.0.0.1".parse().unwrap(),
                prefix_len: 24,
            },
            ipv6,
            listen_port: 51820,
            private_key: KEY.into(),
            hooks: FirewallHooks::default(),
        }
    }

    fn address_lines(text: &str) -> Vec<&str> {
        text.lines().filter(|l| l.starts_with("Address")).collect()
    }

    #[test]
    fn server_v4_only() {
        let text = render_server(&server(None));
        assert_eq!(
            text,
            format!("[Interface]\nAddress = 10.0.0.1/24\nListenPort = 51820\nPrivateKey = {KEY}\n")
        );
        assert_eq!(address_lines(&text), ["Address = 10.0.0.1/24"]);
    }

    #[test]
    fn server_dual_stack_joins_addresses() {
        let text = render_server(&server(Some(InterfaceAddress {
            ip: "fd00::1".parse().unwrap(),
            prefix_len: 64,
        })));
        assert_eq!(address_lines(&text), ["Address = 10.0.0.1/24, fd00::1/64"]);
    }

    #[test]
    fn server_hooks_in_order() {
        let mut profile = server(None);
        profile.hooks = FirewallHooks {
            pre_up: Some("echo up >&2".into()),
            post_down: Some("true".into()),
            ..Default::default()
        }
        .or(FirewallHooks::masquerade("eth0"));

        let text = render_server(&profile);
        let keys: Vec<_> = text
            .lines()
            .filter_map(|l| l.split_once(" = ").map(|(k, _)| k))
            .collect();
        assert_eq!(
            keys,
            ["Address", "ListenPort", "PrivateKey", "PreUp", "PostUp", "PostDown"]
        );
        assert!(text.contains("PreUp = echo up >&2\n"));
        assert!(text.contains("PostDown = true\n"));
        assert!(text.contains("iptables -t nat -A POSTROUTING -o eth0 -j MASQUERADE"));
    }

    #[test]
    fn masquerade_mirrors_up_and_down() {
        let hooks = FirewallHooks::masquerade("ens3");
        let up = hooks.post_up.unwrap();
        let down = hooks.post_down.unwrap();
        assert_eq!(up.replace("-A ", "-D "), down);
        assert!(hooks.pre_up.is_none() && hooks.pre_down.is_none());
    }

    #[test]
    fn peer_stanza_layout() {
        let peer = PeerRecord {
            username: "alice".into(),
            public_key: KEY.into(),
            ipv4: "10.0.0.3".parse().unwrap(),
            ipv6: Some("fd00::3".parse().unwrap()),
        };
        assert_eq!(
            render_peer_stanza(&peer),
            format!("\n[Peer]\n# alice\nPublicKey = {KEY}\nAllowedIPs = 10.0.0.3/32, fd00::3/128\n")
        );
    }

    #[test]
    fn client_config_with_placeholder_key() {
        let client = ClientProfile {
            ipv4: "10.0.0.3".parse().unwrap(),
            ipv6: None,
            private_key: None,
            server_public_key: KEY,
            endpoint: "vpn.example.com:51820",
            dns: "1.1.1.1",
            allowed_ips: "0.0.0.0/0",
            persistent_keepalive: 25,
        };
        let text = render_client_config(&client);
        assert_eq!(
            text,
            format!(
                "[Interface]\nPrivateKey = [your private key]\nAddress = 10.0.0.3/32\n# DNS = 1.1.1.1\n\n[Peer]\nPublicKey = {KEY}\nEndpoint = vpn.example.com:51820\nAllowedIPs = 0.0.0.0/0\nPersistentKeepalive = 25\n"
            )
        );
    }

    #[test]
    fn client_config_dual_stack_with_key() {
        let client = ClientProfile {
            ipv4: "10.0.0.3".parse().unwrap(),
            ipv6: Some("fd00::3".parse().unwrap()),
            private_key: Some("client-private"),
            server_public_key: KEY,
            endpoint: "203.0.113.7:51820",
            dns: "8.8.8.8",
            allowed_ips: "0.0.0.0/0, ::/0",
            persistent_keepalive: 21,
        };
        let text = render_client_config(&client);
        assert!(text.contains("PrivateKey = client-private\n"));
        assert!(text.contains("Address = 10.0.0.3/32, fd00::3/128\n"));
        assert!(text.contains("AllowedIPs = 0.0.0.0/0, ::/0\n"));
    }
}
