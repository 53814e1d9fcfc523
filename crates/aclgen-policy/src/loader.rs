//! Policy file loading.
//!
//! Policies are stored as YAML or JSON renderings of the [`Policy`] model.
//! File format (YAML):
//!
//! ```yaml
//! filters:
//!   - header:
//!       target:
//!         - platform: cisco
//!           options: [edge-inbound, extended]
//!       comment: ["Inbound edge filter"]
//!     terms:
//!       - name: allow-web
//!         action: [accept]
//!         protocol: [tcp]
//!         destination_address:
//!           - {address: 192.0.2.0/24, token: WEB_SERVERS}
//!         destination_port: [80, [8080, 8081]]
//! ```

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{PolicyError, PolicyResult};
use crate::model::Policy;

/// Loads a policy file, choosing the format by extension.
///
/// `.yaml`/`.yml` are parsed as YAML, everything else as JSON.
pub fn load_policy(path: impl AsRef<Path>) -> PolicyResult<Policy> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| PolicyError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let origin = path.display().to_string();
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let policy = if is_yaml {
        parse_yaml(&text, &origin)?
    } else {
        parse_json(&text, &origin)?
    };

    info!(
        "Loaded policy {}: {} filters, {} terms",
        origin,
        policy.filters.len(),
        policy.filters.iter().map(|f| f.terms.len()).sum::<usize>()
    );
    Ok(policy)
}

/// Parses a YAML policy.
pub fn policy_from_yaml(text: &str) -> PolicyResult<Policy> {
    parse_yaml(text, "<inline>")
}

/// Parses a JSON policy.
pub fn policy_from_json(text: &str) -> PolicyResult<Policy> {
    parse_json(text, "<inline>")
}

fn parse_yaml(text: &str, origin: &str) -> PolicyResult<Policy> {
    let policy: Policy = serde_yaml::from_str(text).map_err(|e| PolicyError::parse(origin, e))?;
    validate(&policy)?;
    Ok(policy)
}

fn parse_json(text: &str, origin: &str) -> PolicyResult<Policy> {
    let policy: Policy = serde_json::from_str(text).map_err(|e| PolicyError::parse(origin, e))?;
    validate(&policy)?;
    Ok(policy)
}

/// Structural checks the parser cannot express.
fn validate(policy: &Policy) -> PolicyResult<()> {
    for filter in &policy.filters {
        for term in &filter.terms {
            if term.name.is_empty() {
                return Err(PolicyError::invalid_term("<unnamed>", "term has no name"));
            }
            if term.action.is_empty() && term.verbatim.is_empty() {
                return Err(PolicyError::invalid_term(&term.name, "term has no action"));
            }
            if let Some(range) = term
                .source_port
                .iter()
                .chain(&term.destination_port)
                .find(|r| r.low > r.high)
            {
                return Err(PolicyError::invalid_term(
                    &term.name,
                    format!("invalid port range {}", range),
                ));
            }
            debug!(term = %term.name, "validated term");
        }
    }
    Ok(())
}
