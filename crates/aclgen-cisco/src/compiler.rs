//! Filter compilation.
//!
//! Walks every filter targeting the platform, fans `mixed` filters out into
//! an extended and an inet6 pass, and renders each surviving term with the
//! renderer of the pass's filter type.

use tracing::{debug, info, warn};

use aclgen_policy::{Header, Policy, PolicyServices, Term};

use crate::config::GeneratorConfig;
use crate::error::{AclGenError, Result};
use crate::filter::{FilterSelection, FilterType};
use crate::object_group::ObjectGroups;
use crate::renderer::{RenderContext, TermRenderer};

/// The lines one term rendered to; empty when the term was suppressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTerm {
    pub name: String,
    pub lines: Vec<String>,
}

impl RenderedTerm {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// One filter pass ready for assembly.
#[derive(Debug, Clone)]
pub struct RenderedFilter {
    pub header: Header,
    pub filter_name: String,
    pub filter_type: FilterType,
    pub terms: Vec<RenderedTerm>,
    /// Group definitions; only populated for object-group filters.
    pub object_groups: ObjectGroups,
}

/// Compiles policies into rendered filters.
pub struct FilterCompiler<'a> {
    config: &'a GeneratorConfig,
    services: &'a dyn PolicyServices,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(config: &'a GeneratorConfig, services: &'a dyn PolicyServices) -> Self {
        Self { config, services }
    }

    /// Compiles every filter of `policy` that targets the configured platform.
    ///
    /// A `mixed` filter produces two entries, extended then inet6, the second
    /// named `ipv6-<name>`.
    pub fn compile(&self, policy: &Policy) -> Result<Vec<RenderedFilter>> {
        let platform = self.config.platform.as_str();
        let mut rendered = Vec::new();

        for filter in policy.filters_for(platform) {
            let header = &filter.header;
            let filter_name = header
                .filter_name(platform)
                .ok_or_else(|| AclGenError::MissingFilterName {
                    platform: platform.to_string(),
                })?;
            let selection = self.filter_selection(header, filter_name)?;

            for pass in selection.passes() {
                pass.check_numeric_name(filter_name)?;
                let pass_name = selection.pass_name(filter_name, pass);
                rendered.push(self.compile_pass(header, &filter.terms, pass, pass_name)?);
            }
        }
        Ok(rendered)
    }

    fn filter_selection(&self, header: &Header, filter_name: &str) -> Result<FilterSelection> {
        match header.filter_options(&self.config.platform).get(1) {
            None => Ok(FilterSelection::default()),
            Some(token) => token
                .parse::<FilterSelection>()
                .map_err(|_| AclGenError::UnsupportedFilterType {
                    filter: filter_name.to_string(),
                    filter_type: token.clone(),
                    platform: self.config.platform.clone(),
                }),
        }
    }

    fn compile_pass(
        &self,
        header: &Header,
        terms: &[Term],
        filter_type: FilterType,
        filter_name: String,
    ) -> Result<RenderedFilter> {
        let ctx = RenderContext::new(&filter_name, self.config, self.services);
        let renderer = filter_type.renderer(ctx);
        let mut object_groups = ObjectGroups::new(filter_name.as_str());
        let mut rendered_terms = Vec::with_capacity(terms.len());

        for term in terms {
            let Some(term) = self.prepare_term(term, filter_type, &filter_name)? else {
                continue;
            };

            renderer.validate(&term)?;
            if filter_type == FilterType::ObjectGroup {
                object_groups.add_term(&term, &self.config.platform);
            }
            let lines = renderer.render(&term)?;
            rendered_terms.push(RenderedTerm {
                name: term.name,
                lines,
            });
        }

        info!(
            filter = %filter_name,
            filter_type = %filter_type,
            terms = rendered_terms.len(),
            suppressed = rendered_terms.iter().filter(|t| t.is_empty()).count(),
            "compiled filter"
        );

        Ok(RenderedFilter {
            header: header.clone(),
            filter_name: filter_name.clone(),
            filter_type,
            terms: rendered_terms,
            object_groups,
        })
    }

    /// Applies name truncation, the high-port rewrite and expiry.
    ///
    /// Returns `None` for terms that must not be rendered at all.
    fn prepare_term(
        &self,
        term: &Term,
        filter_type: FilterType,
        filter_name: &str,
    ) -> Result<Option<Term>> {
        let mut term = term.clone();
        term.name = self.services.truncate_name(&term.name);

        let Some(term) = self.services.rewrite_high_ports(&term, filter_type.family())? else {
            debug!(filter = %filter_name, term = %term.name, "term dropped by high-port rewrite");
            return Ok(None);
        };

        if let Some(expiration) = term.expiration {
            if self.config.expires_soon(expiration) {
                info!(
                    filter = %filter_name,
                    term = %term.name,
                    %expiration,
                    weeks = self.config.exp_info_weeks,
                    "term expires soon"
                );
            }
            if self.config.is_expired(expiration) {
                warn!(
                    filter = %filter_name,
                    term = %term.name,
                    %expiration,
                    "term is expired and will not be rendered"
                );
                return Ok(None);
            }
        }
        Ok(Some(term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aclgen_policy::{
        Action, PolicyError, PolicyFilter, PolicyResult, StandardServices, Target,
    };
    use aclgen_types::AddressFamily;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            today: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..Default::default()
        }
    }

    fn policy(options: &[&str], terms: Vec<Term>) -> Policy {
        Policy {
            filters: vec![PolicyFilter {
                header: Header {
                    targets: vec![Target::new("cisco", options.iter().copied())],
                    comment: vec![],
                },
                terms,
            }],
        }
    }

    fn web() -> Term {
        Term::new("allow-web")
            .with_action(Action::Accept)
            .with_protocol("tcp")
            .with_destination_port(80, 80)
    }

    fn compile(policy: &Policy) -> Result<Vec<RenderedFilter>> {
        let config = config();
        let services = StandardServices::default();
        FilterCompiler::new(&config, &services).compile(policy)
    }

    #[test]
    fn test_default_is_extended() {
        let filters = compile(&policy(&["edge-in"], vec![web()])).unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].filter_type, FilterType::Extended);
        assert_eq!(filters[0].filter_name, "edge-in");
        assert!(filters[0].terms[0]
            .lines
            .contains(&" permit tcp any any eq www".to_string()));
    }

    #[test]
    fn test_mixed_fans_out() {
        let filters = compile(&policy(&["edge-in", "mixed"], vec![web()])).unwrap();
        let shape: Vec<(FilterType, &str)> = filters
            .iter()
            .map(|f| (f.filter_type, f.filter_name.as_str()))
            .collect();
        assert_eq!(
            shape,
            vec![(FilterType::Extended, "edge-in"), (FilterType::Inet6, "ipv6-edge-in")]
        );
    }

    #[test]
    fn test_unknown_filter_type() {
        let err = compile(&policy(&["edge-in", "bridged"], vec![web()])).unwrap_err();
        assert!(err.is_unsupported_access_list());
        assert!(err.to_string().contains("bridged"));
    }

    #[test]
    fn test_numeric_names() {
        let std150 = compile(&policy(&["150", "standard"], vec![])).unwrap_err();
        assert!(std150.is_unsupported_access_list());

        let ext50 = compile(&policy(&["50", "extended"], vec![web()])).unwrap_err();
        assert!(ext50.is_unsupported_access_list());

        assert!(compile(&policy(&["50", "standard"], vec![])).is_ok());
        assert!(compile(&policy(&["150"], vec![web()])).is_ok());
    }

    #[test]
    fn test_standard_term_error_aborts() {
        let err = compile(&policy(&["10", "standard"], vec![web()])).unwrap_err();
        assert!(err.is_standard_acl_term());
    }

    #[test]
    fn test_expired_terms_dropped() {
        let mut expired = web();
        expired.name = "old".to_string();
        expired.expiration = NaiveDate::from_ymd_opt(2024, 5, 31);
        let mut today = web();
        today.name = "today".to_string();
        today.expiration = NaiveDate::from_ymd_opt(2024, 6, 1);
        let mut soon = web();
        soon.name = "soon".to_string();
        soon.expiration = NaiveDate::from_ymd_opt(2024, 6, 10);

        let filters = compile(&policy(&["edge-in"], vec![expired, today, soon])).unwrap();
        let names: Vec<&str> = filters[0].terms.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["soon"]);
    }

    #[test]
    fn test_long_names_truncated() {
        let mut term = web();
        term.name = "n".repeat(120);
        let filters = compile(&policy(&["edge-in"], vec![term])).unwrap();
        assert_eq!(filters[0].terms[0].name.len(), 100);
        assert_eq!(filters[0].terms[0].lines[1], format!(" remark {}", "n".repeat(100)));
    }

    #[test]
    fn test_established_gets_high_ports() {
        let term = Term::new("return")
            .with_action(Action::Accept)
            .with_protocol("tcp")
            .with_option("established");
        let filters = compile(&policy(&["edge-in"], vec![term])).unwrap();
        assert_eq!(
            filters[0].terms[0].lines[2],
            " permit tcp any any range 1024 65535 established"
        );
    }

    #[test]
    fn test_established_with_stateless_protocol_fails() {
        let term = Term::new("bad")
            .with_action(Action::Accept)
            .with_protocol("gre")
            .with_option("established");
        let err = compile(&policy(&["edge-in"], vec![term])).unwrap_err();
        assert!(matches!(err, AclGenError::Policy(PolicyError::Established { .. })));
    }

    struct DropAll;

    impl PolicyServices for DropAll {
        fn rewrite_high_ports(&self, _term: &Term, _family: AddressFamily) -> PolicyResult<Option<Term>> {
            Ok(None)
        }
    }

    #[test]
    fn test_inapplicable_terms_dropped() {
        let config = config();
        let filters = FilterCompiler::new(&config, &DropAll)
            .compile(&policy(&["edge-in"], vec![web()]))
            .unwrap();
        assert!(filters[0].terms.is_empty());
    }

    #[test]
    fn test_object_groups_collected() {
        let filters = compile(&policy(&["og-in", "object-group"], vec![web()])).unwrap();
        assert_eq!(filters[0].filter_type, FilterType::ObjectGroup);
        assert!(filters[0].object_groups.is_valid());
        assert_eq!(filters[0].object_groups.filter_name(), "og-in");

        let extended = compile(&policy(&["edge-in"], vec![web()])).unwrap();
        assert!(!extended[0].object_groups.is_valid());
    }

    #[test]
    fn test_other_platforms_ignored() {
        let mut p = policy(&["edge-in"], vec![web()]);
        p.filters[0].header.targets = vec![Target::new("juniper", ["edge-in"])];
        assert!(compile(&p).unwrap().is_empty());
    }
}
