//! Usage: Parse the configured listen address (`host`, `host:port`, `[ipv6]`, `[ipv6]:port`).

use crate::shared::error::AppResult;

pub(crate) const DEFAULT_PORT: u16 = 3000;
const MIN_PORT: u16 = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedListenAddress {
    pub(crate) host: String,
    pub(crate) port: Option<u16>,
}

impl ParsedListenAddress {
    pub(crate) fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

pub(crate) fn is_wildcard_host(host: &str) -> bool {
    matches!(host.trim(), "0.0.0.0" | "::")
}

pub(crate) fn format_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

fn parse_port(raw: &str) -> AppResult<u16> {
    let port: u16 = raw
        .trim()
        .parse()
        .map_err(|_| "LISTEN_ADDRESS_INVALID: invalid listen port".to_string())?;
    if port < MIN_PORT {
        return Err(format!("LISTEN_ADDRESS_INVALID: listen port must be >= {MIN_PORT}").into());
    }
    Ok(port)
}

pub(crate) fn parse_listen_address(input: &str) -> AppResult<ParsedListenAddress> {
    let raw = input.trim();
    if raw.is_empty() {
        return Ok(ParsedListenAddress {
            host: "127.0.0.1".to_string(),
            port: None,
        });
    }
    if raw.contains("://") || raw.contains('/') {
        return Err("LISTEN_ADDRESS_INVALID: listen address must be host or host:port"
            .to_string()
            .into());
    }

    if let Some(rest) = raw.strip_prefix('[') {
        let idx = rest.find(']').ok_or_else(|| {
            "LISTEN_ADDRESS_INVALID: invalid IPv6 address: missing closing ']'".to_string()
        })?;
        let host = rest[..idx].trim();
        if host.is_empty() {
            return Err("LISTEN_ADDRESS_INVALID: listen address missing host"
                .to_string()
                .into());
        }
        let tail = rest[idx + 1..].trim();
        if tail.is_empty() {
            return Ok(ParsedListenAddress {
                host: host.to_string(),
                port: None,
            });
        }
        let port_raw = tail.strip_prefix(':').ok_or_else(|| {
            "LISTEN_ADDRESS_INVALID: listen address must be [ipv6]:port".to_string()
        })?;
        return Ok(ParsedListenAddress {
            host: host.to_string(),
            port: Some(parse_port(port_raw)?),
        });
    }

    match raw.split(':').collect::<Vec<_>>().as_slice() {
        [host] => Ok(ParsedListenAddress {
            host: host.trim().to_string(),
            port: None,
        }),
        [host, port_raw] => {
            let host = host.trim();
            if host.is_empty() {
                return Err("LISTEN_ADDRESS_INVALID: listen address missing host"
                    .to_string()
                    .into());
            }
            Ok(ParsedListenAddress {
                host: host.to_string(),
                port: Some(parse_port(port_raw)?),
            })
        }
        _ => Err("LISTEN_ADDRESS_INVALID: IPv6 must use [addr]:port"
            .to_string()
            .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let parsed = parse_listen_address("127.0.0.1:3000").expect("parse");
        assert_eq!(parsed.host, "127.0.0.1");
        assert_eq!(parsed.port, Some(3000));
    }

    #[test]
    fn bare_host_uses_default_port() {
        let parsed = parse_listen_address("localhost").expect("parse");
        assert_eq!(parsed.port_or_default(), DEFAULT_PORT);
        assert_eq!(
            parse_listen_address("").expect("parse").host,
            "127.0.0.1"
        );
    }

    #[test]
    fn parses_bracketed_ipv6() {
        let parsed = parse_listen_address("[::1]:8080").expect("parse");
        assert_eq!(parsed.host, "::1");
        assert_eq!(parsed.port, Some(8080));
        assert_eq!(format_host_port(&parsed.host, 8080), "[::1]:8080");
    }

    #[test]
    fn rejects_invalid_addresses() {
        for raw in ["http://localhost:3000", "::1", "host:80", "host:abc", "[::1", ":3000"] {
            let err = parse_listen_address(raw).expect_err(raw);
            assert_eq!(err.code(), "LISTEN_ADDRESS_INVALID", "{raw}");
        }
    }

    #[test]
    fn wildcard_hosts_are_detected() {
        assert!(is_wildcard_host("0.0.0.0"));
        assert!(is_wildcard_host("::"));
        assert!(!is_wildcard_host("127.0.0.1"));
    }
}
