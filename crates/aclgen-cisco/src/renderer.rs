//! The term renderer seam.
//!
//! Each [`FilterType`] is backed by one [`TermRenderer`]; the compiler picks
//! the renderer once per filter pass and then only talks to the trait.

use once_cell::sync::Lazy;
use regex::Regex;

use aclgen_policy::protocols::{is_protocol, protocol_number};
use aclgen_policy::{PolicyServices, Term};
use aclgen_types::AddressFamily;

use crate::config::{GeneratorConfig, ProtocolForm};
use crate::error::{AclGenError, Result};
use crate::filter::FilterType;
use crate::object_group::ObjectGroupTerm;
use crate::standard::StandardTerm;
use crate::tables::action_keyword;
use crate::term::ExtendedTerm;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Everything a renderer needs to know about the filter it renders into.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub platform: &'a str,
    pub filter_name: &'a str,
    pub config: &'a GeneratorConfig,
    pub services: &'a dyn PolicyServices,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        filter_name: &'a str,
        config: &'a GeneratorConfig,
        services: &'a dyn PolicyServices,
    ) -> Self {
        Self {
            platform: &config.platform,
            filter_name,
            config,
            services,
        }
    }

    /// IOS keyword for the term's action.
    pub fn action(&self, term: &Term) -> Result<&'static str> {
        term.primary_action()
            .map(action_keyword)
            .ok_or_else(|| AclGenError::invalid_term(self.filter_name, &term.name, "term has no action"))
    }

    /// Wraps every term comment at the configured width.
    pub fn wrapped_comments(&self, term: &Term) -> Vec<String> {
        term.comment
            .iter()
            .flat_map(|comment| self.services.wrap_comment(comment, self.config.comment_width))
            .collect()
    }
}

/// Renders policy terms into IOS lines for one filter type.
pub trait TermRenderer {
    /// Rejects terms the filter type cannot express.
    ///
    /// Called once per term before rendering, even for terms that end up
    /// rendering nothing.
    fn validate(&self, _term: &Term) -> Result<()> {
        Ok(())
    }

    /// Renders a term. An empty vector means the term is suppressed.
    fn render(&self, term: &Term) -> Result<Vec<String>>;
}

impl FilterType {
    /// The renderer for this filter type.
    pub fn renderer<'a>(&self, ctx: RenderContext<'a>) -> Box<dyn TermRenderer + 'a> {
        match self {
            Self::Standard => Box::new(StandardTerm::new(ctx)),
            Self::Extended => Box::new(ExtendedTerm::new(ctx, AddressFamily::Inet)),
            Self::Inet6 => Box::new(ExtendedTerm::new(ctx, AddressFamily::Inet6)),
            Self::ObjectGroup => Box::new(ObjectGroupTerm::new(ctx)),
        }
    }
}

/// Collapses whitespace runs to one space and trims the end.
///
/// The leading space that nests rule lines under the ACL survives.
pub fn collapse_whitespace(line: &str) -> String {
    WHITESPACE_RUN.replace_all(line, " ").trim_end().to_string()
}

/// Protocols as they appear on rule lines.
pub fn resolve_protocols(term: &Term, family: AddressFamily, form: ProtocolForm) -> Vec<String> {
    if term.protocol.is_empty() {
        let any = match family {
            AddressFamily::Inet => "ip",
            AddressFamily::Inet6 => "ipv6",
        };
        return vec![any.to_string()];
    }

    term.protocol
        .iter()
        .map(|protocol| match (protocol.as_str(), form) {
            ("hop-by-hop", _) => "hbh".to_string(),
            (name, ProtocolForm::Number) => protocol_number(name)
                .map(|num| num.to_string())
                .unwrap_or_else(|| name.to_string()),
            (name, ProtocolForm::Name) => name.to_string(),
        })
        .collect()
}

/// Options appended to rule lines.
pub fn rule_options(term: &Term) -> Vec<&'static str> {
    let mut options = Vec::new();
    let stateful = term.has_option("tcp-established") || term.has_option("established");
    if stateful && term.protocol.iter().any(|p| is_protocol(p, "tcp")) {
        options.push("established");
    }
    if term.logging {
        options.push("log");
    }
    options
}

/// Options valid for one line's protocol; UDP carries no connection state.
pub fn line_options(options: &[&'static str], protocol: &str) -> String {
    options
        .iter()
        .filter(|option| !(is_protocol(protocol, "udp") && **option == "established"))
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace(" permit tcp any  any eq www   "),
            " permit tcp any any eq www"
        );
        assert_eq!(collapse_whitespace("\t deny  ip\n any"), " deny ip any");
    }

    #[test]
    fn test_resolve_protocols() {
        let any = Term::new("any");
        assert_eq!(resolve_protocols(&any, AddressFamily::Inet, ProtocolForm::Name), vec!["ip"]);
        assert_eq!(resolve_protocols(&any, AddressFamily::Inet6, ProtocolForm::Name), vec!["ipv6"]);

        let hbh = Term::new("hbh").with_protocol("hop-by-hop");
        assert_eq!(resolve_protocols(&hbh, AddressFamily::Inet6, ProtocolForm::Number), vec!["hbh"]);

        let mixed = Term::new("m").with_protocol("tcp").with_protocol("gre").with_protocol("bogus");
        assert_eq!(
            resolve_protocols(&mixed, AddressFamily::Inet, ProtocolForm::Number),
            vec!["6", "47", "bogus"]
        );
        assert_eq!(
            resolve_protocols(&mixed, AddressFamily::Inet, ProtocolForm::Name),
            vec!["tcp", "gre", "bogus"]
        );
    }

    #[test]
    fn test_rule_options() {
        let tcp = Term::new("t").with_protocol("tcp").with_option("tcp-established");
        assert_eq!(rule_options(&tcp), vec!["established"]);

        let udp_only = Term::new("u").with_protocol("udp").with_option("established");
        assert!(rule_options(&udp_only).is_empty());

        let mut logged = Term::new("l").with_protocol("6").with_option("established");
        logged.logging = true;
        assert_eq!(rule_options(&logged), vec!["established", "log"]);
    }

    #[test]
    fn test_line_options_drop_established_for_udp() {
        let options = ["established", "log"];
        assert_eq!(line_options(&options, "tcp"), "established log");
        assert_eq!(line_options(&options, "udp"), "log");
        assert_eq!(line_options(&options, "17"), "log");
    }
}
