//! ICMP type name → code tables.
//!
//! Policies name ICMP types symbolically; the tables are disjoint per
//! address family (ICMP for `inet`, ICMPv6 for `inet6`).

use once_cell::sync::Lazy;
use std::collections::HashMap;

use aclgen_types::AddressFamily;

static ICMP_TYPES_V4: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    HashMap::from([
        ("echo-reply", 0),
        ("unreachable", 3),
        ("source-quench", 4),
        ("redirect", 5),
        ("alternate-address", 6),
        ("echo-request", 8),
        ("router-advertisement", 9),
        ("router-solicitation", 10),
        ("time-exceeded", 11),
        ("parameter-problem", 12),
        ("timestamp-request", 13),
        ("timestamp-reply", 14),
        ("information-request", 15),
        ("information-reply", 16),
        ("mask-request", 17),
        ("mask-reply", 18),
        ("conversion-error", 31),
        ("mobile-redirect", 32),
    ])
});

static ICMP_TYPES_V6: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    HashMap::from([
        ("destination-unreachable", 1),
        ("packet-too-big", 2),
        ("time-exceeded", 3),
        ("parameter-problem", 4),
        ("echo-request", 128),
        ("echo-reply", 129),
        ("multicast-listener-query", 130),
        ("multicast-listener-report", 131),
        ("multicast-listener-done", 132),
        ("router-solicit", 133),
        ("router-advertisement", 134),
        ("neighbor-solicit", 135),
        ("neighbor-advertisement", 136),
        ("redirect-message", 137),
        ("router-renumbering", 138),
        ("icmp-node-information-query", 139),
        ("icmp-node-information-response", 140),
        ("inverse-neighbor-discovery-solicitation", 141),
        ("inverse-neighbor-discovery-advertisement", 142),
        ("version-2-multicast-listener-report", 143),
        ("home-agent-address-discovery-request", 144),
        ("home-agent-address-discovery-reply", 145),
        ("mobile-prefix-solicitation", 146),
        ("mobile-prefix-advertisement", 147),
        ("certification-path-solicitation", 148),
        ("certification-path-advertisement", 149),
        ("multicast-router-advertisement", 151),
        ("multicast-router-solicitation", 152),
        ("multicast-router-termination", 153),
    ])
});

/// Looks up the numeric code of an ICMP type name for `family`.
pub fn icmp_code(family: AddressFamily, name: &str) -> Option<u8> {
    let table = match family {
        AddressFamily::Inet => &ICMP_TYPES_V4,
        AddressFamily::Inet6 => &ICMP_TYPES_V6,
    };
    table.get(name).copied()
}

/// Protocol name carrying ICMP types for `family`.
pub const fn icmp_protocol(family: AddressFamily) -> &'static str {
    match family {
        AddressFamily::Inet => "icmp",
        AddressFamily::Inet6 => "icmpv6",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v4_lookup() {
        assert_eq!(icmp_code(AddressFamily::Inet, "echo-request"), Some(8));
        assert_eq!(icmp_code(AddressFamily::Inet, "echo-reply"), Some(0));
        assert_eq!(icmp_code(AddressFamily::Inet, "packet-too-big"), None);
    }

    #[test]
    fn test_v6_lookup() {
        assert_eq!(icmp_code(AddressFamily::Inet6, "echo-request"), Some(128));
        assert_eq!(icmp_code(AddressFamily::Inet6, "packet-too-big"), Some(2));
        assert_eq!(icmp_code(AddressFamily::Inet6, "source-quench"), None);
    }

    #[test]
    fn test_icmp_protocol() {
        assert_eq!(icmp_protocol(AddressFamily::Inet), "icmp");
        assert_eq!(icmp_protocol(AddressFamily::Inet6), "icmpv6");
    }
}
