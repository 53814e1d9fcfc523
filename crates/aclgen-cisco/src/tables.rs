//! IOS keyword tables.
//!
//! IOS prints well-known ports and ICMP types by keyword; rendering uses the
//! same keywords so generated config diffs cleanly against `show run`.
//! Numbers missing from a table are rendered as-is.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use aclgen_policy::protocols::is_protocol;
use aclgen_policy::Action;
use aclgen_types::AddressFamily;

static IOS_PORTS_TCP: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (179, "bgp"),
        (19, "chargen"),
        (514, "cmd"),
        (13, "daytime"),
        (9, "discard"),
        (53, "domain"),
        (7, "echo"),
        (512, "exec"),
        (79, "finger"),
        (21, "ftp"),
        (20, "ftp-data"),
        (70, "gopher"),
        (101, "hostname"),
        (113, "ident"),
        (194, "irc"),
        (543, "klogin"),
        (544, "kshell"),
        (513, "login"),
        (515, "lpd"),
        (119, "nntp"),
        (496, "pim-auto-rp"),
        (109, "pop2"),
        (110, "pop3"),
        (25, "smtp"),
        (111, "sunrpc"),
        (49, "tacacs"),
        (517, "talk"),
        (23, "telnet"),
        (37, "time"),
        (540, "uucp"),
        (43, "whois"),
        (80, "www"),
    ])
});

static IOS_PORTS_UDP: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (512, "biff"),
        (68, "bootpc"),
        (67, "bootps"),
        (9, "discard"),
        (195, "dnsix"),
        (53, "domain"),
        (7, "echo"),
        (500, "isakmp"),
        (434, "mobile-ip"),
        (42, "nameserver"),
        (138, "netbios-dgm"),
        (137, "netbios-ns"),
        (139, "netbios-ss"),
        (4500, "non500-isakmp"),
        (123, "ntp"),
        (496, "pim-auto-rp"),
        (520, "rip"),
        (161, "snmp"),
        (162, "snmptrap"),
        (111, "sunrpc"),
        (514, "syslog"),
        (49, "tacacs"),
        (517, "talk"),
        (69, "tftp"),
        (37, "time"),
        (513, "who"),
        (177, "xdmcp"),
    ])
});

static IOS_ICMP_TYPES: Lazy<HashMap<u8, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (6, "alternate-address"),
        (31, "conversion-error"),
        (8, "echo"),
        (0, "echo-reply"),
        (16, "information-reply"),
        (15, "information-request"),
        (18, "mask-reply"),
        (17, "mask-request"),
        (32, "mobile-redirect"),
        (12, "parameter-problem"),
        (5, "redirect"),
        (9, "router-advertisement"),
        (10, "router-solicitation"),
        (4, "source-quench"),
        (11, "time-exceeded"),
        (14, "timestamp-reply"),
        (13, "timestamp-request"),
        (30, "traceroute"),
        (3, "unreachable"),
    ])
});

static IOS_ICMPV6_TYPES: Lazy<HashMap<u8, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (1, "unreachable"),
        (2, "packet-too-big"),
        (3, "time-exceeded"),
        (4, "parameter-problem"),
        (128, "echo-request"),
        (129, "echo-reply"),
    ])
});

/// Port keyword for `protocol`, or the number itself.
pub fn port_name(protocol: &str, port: u16) -> String {
    let table = if is_protocol(protocol, "tcp") {
        &IOS_PORTS_TCP
    } else if is_protocol(protocol, "udp") {
        &IOS_PORTS_UDP
    } else {
        return port.to_string();
    };
    table
        .get(&port)
        .map(|name| name.to_string())
        .unwrap_or_else(|| port.to_string())
}

/// ICMP type keyword for the family, or the number itself.
pub fn icmp_type_name(family: AddressFamily, code: u8) -> String {
    let table = match family {
        AddressFamily::Inet => &IOS_ICMP_TYPES,
        AddressFamily::Inet6 => &IOS_ICMPV6_TYPES,
    };
    table
        .get(&code)
        .map(|name| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// IOS keyword for a term action.
///
/// IOS has no TCP reset primitive and no fallthrough; `next` becomes a
/// comment line.
pub const fn action_keyword(action: Action) -> &'static str {
    match action {
        Action::Accept => "permit",
        Action::Deny | Action::Reject | Action::RejectWithTcpRst => "deny",
        Action::Next => "! next",
    }
}
