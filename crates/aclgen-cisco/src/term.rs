//! Extended and inet6 term rendering.
//!
//! A term expands into one rule line per combination of source address,
//! destination address, source port, destination port, protocol and ICMP
//! type, iterated in that order with the source address outermost.

use itertools::iproduct;
use std::fmt;
use tracing::debug;

use aclgen_policy::icmp::icmp_code;
use aclgen_policy::{AddressField, PortRange, Term};
use aclgen_types::{exclude_addresses, Address, AddressFamily};

use crate::error::{AclGenError, Result};
use crate::renderer::{
    collapse_whitespace, line_options, resolve_protocols, rule_options, RenderContext, TermRenderer,
};
use crate::tables::{icmp_type_name, port_name};

/// One side of a rule line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Any,
    Address(Address),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Address(addr) if addr.is_host() => write!(f, "host {}", addr.prefix.address()),
            Self::Address(addr) => match addr.family() {
                AddressFamily::Inet => {
                    write!(f, "{} {}", addr.prefix.network(), addr.prefix.hostmask())
                }
                AddressFamily::Inet6 => {
                    write!(f, "{}/{}", addr.prefix.network(), addr.prefix.prefix_len())
                }
            },
        }
    }
}

/// Resolves one side of a term for `family`.
///
/// An undeclared side is `any`. A declared side that is empty once the family
/// filter and excludes are applied yields `None`: the term must be dropped.
pub fn resolve_endpoints(
    term: &Term,
    field: AddressField,
    exclude_field: AddressField,
    family: AddressFamily,
) -> Option<Vec<Endpoint>> {
    if term.address_list(field).is_empty() {
        return Some(vec![Endpoint::Any]);
    }

    let mut addresses = term.addresses_for_family(field, family);
    let excludes = term.addresses_for_family(exclude_field, family);
    if !excludes.is_empty() {
        addresses = exclude_addresses(&addresses, &excludes);
    }
    if addresses.is_empty() {
        return None;
    }
    Some(addresses.into_iter().map(Endpoint::Address).collect())
}

/// Replaces every two-port range `(n, n+1)` with two single ports.
pub fn split_consecutive_ports(ports: &[PortRange]) -> Vec<PortRange> {
    let mut split = Vec::with_capacity(ports.len());
    for range in ports {
        if u32::from(range.low) + 1 == u32::from(range.high) {
            split.push(PortRange::single(range.low));
            split.push(PortRange::single(range.high));
        } else {
            split.push(*range);
        }
    }
    split
}

/// Renders extended (IPv4) and inet6 terms.
pub struct ExtendedTerm<'a> {
    ctx: RenderContext<'a>,
    family: AddressFamily,
}

impl<'a> ExtendedTerm<'a> {
    pub fn new(ctx: RenderContext<'a>, family: AddressFamily) -> Self {
        Self { ctx, family }
    }

    /// ` remark` lines naming the term and carrying its comments.
    fn remarks(&self, term: &Term) -> Vec<String> {
        let mut lines = vec![String::new(), format!(" remark {}", term.name)];

        let owner = term.owner.as_ref().map(|owner| format!("Owner: {}", owner));
        for comment in term.comment.iter().chain(owner.iter()) {
            for line in comment.split('\n') {
                let line: String = line.chars().take(self.ctx.config.remark_max_length).collect();
                lines.push(format!(" remark {}", line));
            }
        }
        lines
    }

    /// Numeric ICMP codes for the declared ICMP types.
    fn icmp_codes(&self, term: &Term) -> Result<Vec<u8>> {
        let protocol = match term.protocol.as_slice() {
            [protocol] if protocol == "icmp" || protocol == "icmpv6" => protocol.as_str(),
            _ => {
                return Err(self.invalid(
                    term,
                    format!(
                        "icmp-type requires a single icmp or icmpv6 protocol, found {:?}",
                        term.protocol
                    ),
                ))
            }
        };
        let expected = match self.family {
            AddressFamily::Inet => "icmp",
            AddressFamily::Inet6 => "icmpv6",
        };
        if protocol != expected {
            return Err(self.invalid(
                term,
                format!("icmp-type with protocol {} cannot render for {}", protocol, self.family),
            ));
        }

        term.icmp_type
            .iter()
            .map(|name| {
                name.parse::<u8>()
                    .ok()
                    .or_else(|| icmp_code(self.family, name))
                    .ok_or_else(|| {
                        self.invalid(term, format!("unknown {} icmp-type {}", self.family, name))
                    })
            })
            .collect()
    }

    fn invalid(&self, term: &Term, message: String) -> AclGenError {
        AclGenError::invalid_term(self.ctx.filter_name, &term.name, message)
    }

    #[allow(clippy::too_many_arguments)]
    fn format_line(
        &self,
        action: &str,
        protocol: &str,
        src: &Endpoint,
        sport: Option<&PortRange>,
        dst: &Endpoint,
        dport: Option<&PortRange>,
        icmp: Option<u8>,
        options: &[&'static str],
    ) -> String {
        let icmp = icmp
            .map(|code| icmp_type_name(self.family, code))
            .unwrap_or_default();
        collapse_whitespace(&format!(
            " {} {} {} {} {} {} {} {}",
            action,
            protocol,
            src,
            port_clause(protocol, sport),
            dst,
            port_clause(protocol, dport),
            icmp,
            line_options(options, protocol)
        ))
    }
}

impl TermRenderer for ExtendedTerm<'_> {
    fn render(&self, term: &Term) -> Result<Vec<String>> {
        if term.excludes_platform(self.ctx.platform) {
            debug!(filter = %self.ctx.filter_name, term = %term.name, "term not rendered for platform");
            return Ok(Vec::new());
        }
        if self.family == AddressFamily::Inet && term.protocol.iter().any(|p| p == "icmpv6") {
            debug!(
                filter = %self.ctx.filter_name,
                term = %term.name,
                family = %self.family,
                "icmpv6 term not rendered"
            );
            return Ok(Vec::new());
        }

        let mut lines = self.remarks(term);
        if !term.verbatim.is_empty() {
            lines.extend(term.verbatim_for(self.ctx.platform).map(str::to_string));
            return Ok(lines);
        }

        let action = self.ctx.action(term)?;
        let protocols = resolve_protocols(term, self.family, self.ctx.config.protocol_form);

        let sources =
            resolve_endpoints(term, AddressField::Source, AddressField::SourceExclude, self.family);
        let destinations = resolve_endpoints(
            term,
            AddressField::Destination,
            AddressField::DestinationExclude,
            self.family,
        );
        let (sources, destinations) = match (sources, destinations) {
            (Some(sources), Some(destinations)) => (sources, destinations),
            (sources, _) => {
                let direction = if sources.is_none() { "source" } else { "destination" };
                debug!(
                    filter = %self.ctx.filter_name,
                    term = %term.name,
                    direction,
                    family = %self.family,
                    "no addresses left, term not rendered"
                );
                return Ok(Vec::new());
            }
        };

        let options = rule_options(term);
        let source_ports = port_slots(&term.source_port);
        let destination_ports = port_slots(&term.destination_port);
        let icmp_types: Vec<Option<u8>> = if term.icmp_type.is_empty() {
            vec![None]
        } else {
            self.icmp_codes(term)?.into_iter().map(Some).collect()
        };

        lines.extend(
            iproduct!(
                sources.iter(),
                destinations.iter(),
                source_ports.iter(),
                destination_ports.iter(),
                protocols.iter(),
                icmp_types.iter()
            )
            .map(|(src, dst, sport, dport, protocol, icmp)| {
                self.format_line(
                    action,
                    protocol,
                    src,
                    sport.as_ref(),
                    dst,
                    dport.as_ref(),
                    *icmp,
                    &options,
                )
            }),
        );
        Ok(lines)
    }
}

/// Declared ports after splitting, or a single "no port clause" slot.
fn port_slots(ports: &[PortRange]) -> Vec<Option<PortRange>> {
    if ports.is_empty() {
        return vec![None];
    }
    split_consecutive_ports(ports).into_iter().map(Some).collect()
}

fn port_clause(protocol: &str, range: Option<&PortRange>) -> String {
    match range {
        None => String::new(),
        Some(range) if range.is_single() => format!("eq {}", port_name(protocol, range.low)),
        Some(range) => format!(
            "range {} {}",
            port_name(protocol, range.low),
            port_name(protocol, range.high)
        ),
    }
}
