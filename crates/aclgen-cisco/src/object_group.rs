//! Object-group rendering.
//!
//! Rule lines reference named groups instead of literal addresses and ports:
//!
//! ```text
//! object-group ip address WEB_SERVERS
//!  10.1.0.0 255.255.255.0
//! exit
//!
//! object-group ip port 443-443
//!  eq 443
//! exit
//!
//!  permit tcp addrgroup ANY addrgroup WEB_SERVERS portgroup 443-443
//! ```
//!
//! Address groups are keyed by the policy token the addresses were declared
//! under, port groups by `low-high`. [`ObjectGroups`] collects the group
//! definitions for one filter; [`ObjectGroupTerm`] renders the rule lines.
//! Both resolve a term's groups through [`address_group`] so they agree on
//! names. Object groups are IPv4 only.

use itertools::iproduct;
use std::collections::HashSet;
use tracing::debug;

use aclgen_policy::{AddressField, PortRange, Term};
use aclgen_types::{exclude_addresses, AddressFamily, IpPrefix};

use crate::error::Result;
use crate::renderer::{
    collapse_whitespace, line_options, resolve_protocols, rule_options, RenderContext, TermRenderer,
};

/// Name of the group standing in for an undeclared side.
pub const ANY_GROUP: &str = "ANY";

/// A named set of IPv4 prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressGroup {
    pub token: String,
    pub members: Vec<IpPrefix>,
}

impl AddressGroup {
    /// The synthetic group matching every IPv4 address.
    pub fn any() -> Self {
        Self {
            token: ANY_GROUP.to_string(),
            members: vec![IpPrefix::default_route(AddressFamily::Inet)],
        }
    }

    fn definition(&self) -> Vec<String> {
        let mut lines = vec![format!("object-group ip address {}", self.token)];
        lines.extend(
            self.members
                .iter()
                .map(|prefix| format!(" {} {}", prefix.network(), prefix.netmask())),
        );
        lines.push("exit".to_string());
        lines.push(String::new());
        lines
    }
}

/// Which side of a term a group belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

impl Side {
    fn fields(&self) -> (AddressField, AddressField) {
        match self {
            Self::Source => (AddressField::Source, AddressField::SourceExclude),
            Self::Destination => (AddressField::Destination, AddressField::DestinationExclude),
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Self::Source => "src",
            Self::Destination => "dst",
        }
    }
}

/// The address group for one side of a term.
///
/// An undeclared side is [`AddressGroup::any`]. A declared side with no IPv4
/// addresses left after excludes yields `None`. The group is named after the
/// token of its first member, or `<term>-src` / `<term>-dst` when the
/// addresses carry no token.
pub fn address_group(term: &Term, side: Side) -> Option<AddressGroup> {
    let (field, exclude_field) = side.fields();
    if term.address_list(field).is_empty() {
        return Some(AddressGroup::any());
    }

    let mut addresses = term.addresses_for_family(field, AddressFamily::Inet);
    let excludes = term.addresses_for_family(exclude_field, AddressFamily::Inet);
    if !excludes.is_empty() {
        addresses = exclude_addresses(&addresses, &excludes);
    }
    let first = addresses.first()?;
    let token = first
        .token()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}-{}", term.name, side.suffix()));

    Some(AddressGroup {
        token,
        members: addresses.iter().map(|addr| addr.prefix).collect(),
    })
}

fn port_key(range: &PortRange) -> String {
    format!("{}-{}", range.low, range.high)
}

/// Group definitions collected for one object-group filter.
#[derive(Debug, Clone, Default)]
pub struct ObjectGroups {
    filter_name: String,
    seen_addresses: HashSet<String>,
    seen_ports: HashSet<String>,
    definitions: Vec<String>,
}

impl ObjectGroups {
    pub fn new(filter_name: impl Into<String>) -> Self {
        Self {
            filter_name: filter_name.into(),
            ..Default::default()
        }
    }

    pub fn filter_name(&self) -> &str {
        &self.filter_name
    }

    /// Records the groups a term references. Each group is defined once, the
    /// first time any term references it. Terms that render no rule line
    /// define nothing.
    pub fn add_term(&mut self, term: &Term, platform: &str) {
        if term.excludes_platform(platform) || !term.verbatim.is_empty() {
            return;
        }
        let (Some(source), Some(destination)) = (
            address_group(term, Side::Source),
            address_group(term, Side::Destination),
        ) else {
            return;
        };

        for group in [source, destination] {
            if self.seen_addresses.insert(group.token.clone()) {
                self.definitions.extend(group.definition());
            }
        }

        for range in term.source_port.iter().chain(&term.destination_port) {
            let key = port_key(range);
            if !self.seen_ports.insert(key.clone()) {
                continue;
            }
            self.definitions.push(format!("object-group ip port {}", key));
            if range.is_single() {
                self.definitions.push(format!(" eq {}", range.low));
            } else {
                self.definitions.push(format!(" range {} {}", range.low, range.high));
            }
            self.definitions.push("exit".to_string());
            self.definitions.push(String::new());
        }
    }

    /// Returns true once any group has been defined.
    pub fn is_valid(&self) -> bool {
        !self.definitions.is_empty()
    }

    /// The definition block, led by an empty line; empty when no group exists.
    pub fn lines(&self) -> Vec<String> {
        if !self.is_valid() {
            return Vec::new();
        }
        std::iter::once(String::new())
            .chain(self.definitions.iter().cloned())
            .collect()
    }
}

/// Renders the rule lines of an object-group filter.
pub struct ObjectGroupTerm<'a> {
    ctx: RenderContext<'a>,
}

impl<'a> ObjectGroupTerm<'a> {
    pub fn new(ctx: RenderContext<'a>) -> Self {
        Self { ctx }
    }
}

impl TermRenderer for ObjectGroupTerm<'_> {
    fn render(&self, term: &Term) -> Result<Vec<String>> {
        if term.excludes_platform(self.ctx.platform) {
            debug!(filter = %self.ctx.filter_name, term = %term.name, "term not rendered for platform");
            return Ok(Vec::new());
        }

        let mut lines = vec![String::new(), format!(" remark {}", term.name)];
        lines.extend(
            self.ctx
                .wrapped_comments(term)
                .into_iter()
                .map(|comment| format!(" remark {}", comment)),
        );
        if !term.verbatim.is_empty() {
            lines.extend(term.verbatim_for(self.ctx.platform).map(str::to_string));
            return Ok(lines);
        }

        let (source, destination) = match (
            address_group(term, Side::Source),
            address_group(term, Side::Destination),
        ) {
            (Some(source), Some(destination)) => (source, destination),
            _ => {
                debug!(
                    filter = %self.ctx.filter_name,
                    term = %term.name,
                    "no inet addresses left, term not rendered"
                );
                return Ok(Vec::new());
            }
        };

        let action = self.ctx.action(term)?;
        let protocols = resolve_protocols(term, AddressFamily::Inet, self.ctx.config.protocol_form);
        let options = rule_options(term);
        let source_ports = port_groups(&term.source_port);
        let destination_ports = port_groups(&term.destination_port);

        lines.extend(
            iproduct!(source_ports.iter(), destination_ports.iter(), protocols.iter()).map(
                |(sport, dport, protocol)| {
                    collapse_whitespace(&format!(
                        " {} {} addrgroup {} {} addrgroup {} {} {}",
                        action,
                        protocol,
                        source.token,
                        sport,
                        destination.token,
                        dport,
                        line_options(&options, protocol)
                    ))
                },
            ),
        );
        Ok(lines)
    }
}

/// `portgroup` references for declared ports, or one empty slot.
fn port_groups(ports: &[PortRange]) -> Vec<String> {
    if ports.is_empty() {
        return vec![String::new()];
    }
    ports
        .iter()
        .map(|range| format!("portgroup {}", port_key(range)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use aclgen_policy::{Action, StandardServices};
    use aclgen_types::Address;
    use pretty_assertions::assert_eq;

    fn tagged(prefix: &str, token: &str) -> Address {
        Address::with_token(prefix.parse().unwrap(), token)
    }

    fn render(term: &Term) -> Vec<String> {
        let config = GeneratorConfig::default();
        let services = StandardServices::default();
        let ctx = RenderContext::new("og-edge", &config, &services);
        ObjectGroupTerm::new(ctx).render(term).unwrap()
    }

    fn web_term(name: &str) -> Term {
        Term::new(name)
            .with_action(Action::Accept)
            .with_protocol("tcp")
            .with_source_address(tagged("10.0.0.0/8", "INTERNAL"))
            .with_source_address(tagged("172.16.0.0/12", "INTERNAL"))
            .with_destination_port(443, 443)
    }

    #[test]
    fn test_rule_lines_reference_groups() {
        let term = web_term("web").with_destination_port(8000, 8080);
        assert_eq!(
            render(&term),
            vec![
                "",
                " remark web",
                " permit tcp addrgroup INTERNAL addrgroup ANY portgroup 443-443",
                " permit tcp addrgroup INTERNAL addrgroup ANY portgroup 8000-8080",
            ]
        );
    }

    #[test]
    fn test_shared_token_defined_once() {
        let mut groups = ObjectGroups::new("og-edge");
        let first = web_term("web");
        let second = web_term("web-again").with_destination_address(tagged("192.0.2.10/32", "DNS"));
        groups.add_term(&first, "cisco");
        groups.add_term(&second, "cisco");

        let lines = groups.lines();
        let internal = lines
            .iter()
            .filter(|l| *l == "object-group ip address INTERNAL")
            .count();
        assert_eq!(internal, 1);
        assert_eq!(
            lines,
            vec![
                "",
                "object-group ip address INTERNAL",
                " 10.0.0.0 255.0.0.0",
                " 172.16.0.0 255.240.0.0",
                "exit",
                "",
                "object-group ip address ANY",
                " 0.0.0.0 0.0.0.0",
                "exit",
                "",
                "object-group ip port 443-443",
                " eq 443",
                "exit",
                "",
                "object-group ip address DNS",
                " 192.0.2.10 255.255.255.255",
                "exit",
                "",
            ]
        );

        assert!(render(&second)
            .contains(&" permit tcp addrgroup INTERNAL addrgroup DNS portgroup 443-443".to_string()));
        assert!(render(&first)
            .contains(&" permit tcp addrgroup INTERNAL addrgroup ANY portgroup 443-443".to_string()));
    }

    #[test]
    fn test_port_range_group_and_raw_pairs() {
        let mut groups = ObjectGroups::new("og");
        let term = Term::new("pair")
            .with_action(Action::Accept)
            .with_protocol("udp")
            .with_source_port(1, 2);
        groups.add_term(&term, "cisco");
        let lines = groups.lines();
        assert!(lines.contains(&"object-group ip port 1-2".to_string()));
        assert!(lines.contains(&" range 1 2".to_string()));
        assert_eq!(
            render(&term)[2],
            " permit udp addrgroup ANY portgroup 1-2 addrgroup ANY"
        );
    }

    #[test]
    fn test_untagged_addresses_named_after_term() {
        let term = Term::new("mgmt")
            .with_action(Action::Deny)
            .with_destination_address(Address::new("10.9.0.0/16".parse().unwrap()));
        let group = address_group(&term, Side::Destination).unwrap();
        assert_eq!(group.token, "mgmt-dst");
        assert_eq!(render(&term)[2], " deny ip addrgroup ANY addrgroup mgmt-dst");
    }

    #[test]
    fn test_v6_only_side_is_suppressed() {
        let term = Term::new("v6")
            .with_action(Action::Accept)
            .with_source_address(tagged("2001:db8::/32", "V6NET"));
        assert!(address_group(&term, Side::Source).is_none());
        assert!(render(&term).is_empty());

        let mut groups = ObjectGroups::new("og");
        groups.add_term(&term, "cisco");
        assert!(groups.lines().is_empty());
    }

    #[test]
    fn test_suppressed_term_defines_no_groups() {
        let term = Term::new("mixed-sides")
            .with_action(Action::Accept)
            .with_protocol("tcp")
            .with_source_address(tagged("10.0.0.0/8", "INTERNAL"))
            .with_destination_address(tagged("2001:db8::/32", "V6NET"))
            .with_destination_port(443, 443);
        assert!(render(&term).is_empty());

        let mut groups = ObjectGroups::new("og");
        groups.add_term(&term, "cisco");
        assert!(!groups.is_valid());

        groups.add_term(&web_term("web"), "cisco");
        let lines = groups.lines();
        assert_eq!(lines[1], "object-group ip address INTERNAL");
        assert_eq!(lines.iter().filter(|l| l.starts_with("object-group")).count(), 3);
    }

    #[test]
    fn test_empty_aggregator() {
        let groups = ObjectGroups::new("og");
        assert!(!groups.is_valid());
        assert!(groups.lines().is_empty());
        assert_eq!(groups.filter_name(), "og");
    }

    #[test]
    fn test_wrapped_comments() {
        let term = Term::new("noted")
            .with_action(Action::Accept)
            .with_comment("a ".repeat(40).trim_end().to_string());
        let lines = render(&term);
        assert_eq!(lines[2].len(), " remark ".len() + 69);
        assert_eq!(lines[3], " remark a a a a a");
    }
}
