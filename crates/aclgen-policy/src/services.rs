//! Generator services shared by every platform generator.
//!
//! Generators call these through [`PolicyServices`] so the rules can be
//! swapped per deployment (or stubbed in tests):
//!
//! | service | contract |
//! |---------|----------|
//! | [`PolicyServices::truncate_name`] | `name -> name` |
//! | [`PolicyServices::rewrite_high_ports`] | `term, family -> term or none` |
//! | [`PolicyServices::wrap_comment`] | `text, width -> lines` |
//! | [`PolicyServices::stamp_banner`] | `prefix, date, revision -> lines` |

use tracing::debug;

use aclgen_types::AddressFamily;

use crate::error::{PolicyError, PolicyResult};
use crate::model::{PortRange, Term};

/// Default maximum term-name length.
pub const DEFAULT_TERM_NAME_MAX_LENGTH: usize = 100;

/// Ephemeral port range appended for `established` terms.
pub const HIGH_PORTS: PortRange = PortRange::new(1024, 65535);

/// Collaborator services consumed by the generators.
pub trait PolicyServices {
    /// Normalizes a term name for the target platform.
    fn truncate_name(&self, name: &str) -> String {
        name.to_string()
    }

    /// Rewrites a term for the address family context.
    ///
    /// Returns `Ok(None)` when the term does not apply and must be dropped.
    fn rewrite_high_ports(&self, term: &Term, _family: AddressFamily) -> PolicyResult<Option<Term>> {
        Ok(Some(term.clone()))
    }

    /// Wraps free-text comment into lines no longer than `width`.
    fn wrap_comment(&self, text: &str, width: usize) -> Vec<String> {
        wrap_words(text, width)
    }

    /// Repository stamp lines, each prefixed with `prefix`.
    fn stamp_banner(&self, prefix: &str, include_date: bool, include_revision: bool) -> Vec<String> {
        repository_tags(prefix, include_date, include_revision)
    }
}

/// The stock services used by the command-line generator.
#[derive(Debug, Clone)]
pub struct StandardServices {
    /// Names longer than this are truncated.
    pub term_name_max_length: usize,
}

impl Default for StandardServices {
    fn default() -> Self {
        Self {
            term_name_max_length: DEFAULT_TERM_NAME_MAX_LENGTH,
        }
    }
}

impl StandardServices {
    pub fn new(term_name_max_length: usize) -> Self {
        Self {
            term_name_max_length,
        }
    }
}

impl PolicyServices for StandardServices {
    fn truncate_name(&self, name: &str) -> String {
        if name.chars().count() <= self.term_name_max_length {
            return name.to_string();
        }
        let truncated: String = name.chars().take(self.term_name_max_length).collect();
        debug!(term = %name, truncated = %truncated, "term name truncated");
        truncated
    }

    fn rewrite_high_ports(&self, term: &Term, family: AddressFamily) -> PolicyResult<Option<Term>> {
        if !term.option.iter().any(|o| o.starts_with("established")) {
            return Ok(Some(term.clone()));
        }

        let stateless: Vec<String> = if term.protocol.is_empty() {
            vec![family.to_string()]
        } else {
            term.protocol
                .iter()
                .filter(|p| *p != "tcp" && *p != "udp")
                .cloned()
                .collect()
        };
        if !stateless.is_empty() {
            return Err(PolicyError::Established {
                term: term.name.clone(),
                protocols: stateless,
            });
        }

        let mut rewritten = term.clone();
        rewritten.destination_port.push(HIGH_PORTS);
        rewritten.destination_port = collapse_port_list(&rewritten.destination_port);
        Ok(Some(rewritten))
    }
}

/// Sorts port ranges and merges overlapping or adjacent ones.
pub fn collapse_port_list(ports: &[PortRange]) -> Vec<PortRange> {
    let mut sorted = ports.to_vec();
    sorted.sort();

    let mut collapsed: Vec<PortRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match collapsed.last_mut() {
            Some(last) if u32::from(range.low) <= u32::from(last.high) + 1 => {
                last.high = last.high.max(range.high);
            }
            _ => collapsed.push(range),
        }
    }
    collapsed
}

/// Greedy word wrap.
///
/// Embedded newlines start new lines; words longer than `width` are split
/// into `width`-sized pieces. Blank lines are dropped.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if word.chars().count() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let chars: Vec<char> = word.chars().collect();
                lines.extend(chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
                continue;
            }

            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Repository keyword stamps (`$Id:$`, `$Date:$`, `$Revision:$`).
pub fn repository_tags(prefix: &str, include_date: bool, include_revision: bool) -> Vec<String> {
    // Built from pieces so the stamps are not expanded in this file.
    let tag = |name: &str| format!("{}{}{}:{}", prefix, '$', name, '$');

    let mut tags = vec![tag("Id")];
    if include_date {
        tags.push(tag("Date"));
    }
    if include_revision {
        tags.push(tag("Revision"));
    }
    tags
}
