//! Protocol name → IANA protocol number table.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static PROTOCOL_NUMBERS: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    HashMap::from([
        ("hopopt", 0),
        ("icmp", 1),
        ("igmp", 2),
        ("ggp", 3),
        ("ipencap", 4),
        ("tcp", 6),
        ("egp", 8),
        ("igp", 9),
        ("udp", 17),
        ("rdp", 27),
        ("ipv6", 41),
        ("ipv6-route", 43),
        ("fragment", 44),
        ("rsvp", 46),
        ("gre", 47),
        ("esp", 50),
        ("ah", 51),
        ("icmpv6", 58),
        ("ipv6-nonxt", 59),
        ("ipv6-opts", 60),
        ("ospf", 89),
        ("pim", 103),
        ("vrrp", 112),
        ("l2tp", 115),
        ("sctp", 132),
    ])
});

/// IANA number for a protocol name.
pub fn protocol_number(name: &str) -> Option<u8> {
    PROTOCOL_NUMBERS.get(name).copied()
}

/// Returns true if `protocol` (name or number) denotes `name`.
pub fn is_protocol(protocol: &str, name: &str) -> bool {
    protocol == name
        || protocol_number(name).is_some_and(|num| protocol.parse::<u8>().ok() == Some(num))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_number() {
        assert_eq!(protocol_number("tcp"), Some(6));
        assert_eq!(protocol_number("udp"), Some(17));
        assert_eq!(protocol_number("icmpv6"), Some(58));
        assert_eq!(protocol_number("made-up"), None);
    }

    #[test]
    fn test_is_protocol() {
        assert!(is_protocol("tcp", "tcp"));
        assert!(is_protocol("6", "tcp"));
        assert!(is_protocol("17", "udp"));
        assert!(!is_protocol("udp", "tcp"));
        assert!(!is_protocol("17", "tcp"));
    }
}
