//! Standard access-list terms.
//!
//! Standard lists match on a single address and nothing else. Terms carry the
//! matched prefixes in their generic `address` field; every other match field
//! is rejected before rendering.

use tracing::{debug, warn};

use aclgen_policy::{AddressField, Term};
use aclgen_types::{Address, AddressFamily};

use crate::error::{AclGenError, Result, StandardField};
use crate::filter::is_numeric_name;
use crate::renderer::{RenderContext, TermRenderer};

/// Renders terms of numbered and named standard lists.
pub struct StandardTerm<'a> {
    ctx: RenderContext<'a>,
    numeric: bool,
}

impl<'a> StandardTerm<'a> {
    pub fn new(ctx: RenderContext<'a>) -> Self {
        Self {
            numeric: is_numeric_name(ctx.filter_name),
            ctx,
        }
    }

    /// First forbidden field the term declares, in check order.
    fn forbidden_field(term: &Term) -> Option<StandardField> {
        let addresses = [
            AddressField::AddressExclude,
            AddressField::Source,
            AddressField::SourceExclude,
            AddressField::Destination,
            AddressField::DestinationExclude,
        ];

        if !term.protocol.is_empty() {
            Some(StandardField::Protocol)
        } else if !term.icmp_type.is_empty() {
            Some(StandardField::IcmpType)
        } else if addresses.iter().any(|field| !term.address_list(*field).is_empty()) {
            Some(StandardField::Address)
        } else if !term.option.is_empty() {
            Some(StandardField::Option)
        } else if !term.source_port.is_empty() || !term.destination_port.is_empty() {
            Some(StandardField::Port)
        } else if term.counter.is_some() {
            Some(StandardField::Counter)
        } else {
            None
        }
    }

    fn match_clause(&self, addr: Option<&Address>) -> String {
        match addr {
            None => "any".to_string(),
            Some(addr) if addr.prefix.is_host_route() && self.numeric => {
                addr.prefix.address().to_string()
            }
            Some(addr) if addr.prefix.is_host_route() => format!("host {}", addr.prefix.address()),
            Some(addr) => format!("{} {}", addr.prefix.network(), addr.prefix.hostmask()),
        }
    }
}

impl TermRenderer for StandardTerm<'_> {
    fn validate(&self, term: &Term) -> Result<()> {
        if let Some(field) = Self::forbidden_field(term) {
            return Err(AclGenError::StandardAclTerm {
                filter: self.ctx.filter_name.to_string(),
                term: term.name.clone(),
                field,
            });
        }
        if term.logging {
            warn!(
                filter = %self.ctx.filter_name,
                term = %term.name,
                "standard ACL logging may not be implemented on all IOS versions"
            );
        }
        Ok(())
    }

    fn render(&self, term: &Term) -> Result<Vec<String>> {
        if term.excludes_platform(self.ctx.platform) {
            debug!(filter = %self.ctx.filter_name, term = %term.name, "term not rendered for platform");
            return Ok(Vec::new());
        }
        if !term.verbatim.is_empty() {
            return Ok(term.verbatim_for(self.ctx.platform).map(str::to_string).collect());
        }

        let prefix = if self.numeric {
            format!("access-list {} ", self.ctx.filter_name)
        } else {
            " ".to_string()
        };
        let action = self.ctx.action(term)?;
        let log = if term.logging { " log" } else { "" };

        let mut lines = vec![format!("{}remark {}", prefix, term.name)];
        lines.extend(
            self.ctx
                .wrapped_comments(term)
                .into_iter()
                .map(|comment| format!("{}remark {}", prefix, comment)),
        );

        let addresses = term.addresses_for_family(AddressField::Address, AddressFamily::Inet);
        if addresses.is_empty() {
            lines.push(format!("{}{} {}{}", prefix, action, self.match_clause(None), log));
        } else {
            lines.extend(addresses.iter().map(|addr| {
                format!("{}{} {}{}", prefix, action, self.match_clause(Some(addr)), log)
            }));
        }
        Ok(lines)
    }
}
