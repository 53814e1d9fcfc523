//! Cisco IOS access-list generator.
//!
//! Renders a [`aclgen_policy::Policy`] into IOS `access-list` configuration:
//!
//! - [`compiler`]: selects the filters for the platform, resolves filter names
//!   and types, and renders every term
//! - [`term`]: extended and inet6 rule lines
//! - [`standard`]: numbered and named standard lists
//! - [`object_group`]: `object-group` definitions and the rule lines using them
//! - [`output`]: joins rendered filters into configuration text
//! - [`tables`]: IOS port, ICMP type and action keywords
//!
//! # Filter types
//!
//! | header option | output |
//! |---------------|--------|
//! | `extended` (default) | `ip access-list extended <name>` |
//! | `standard` | `access-list <n>` or `ip access-list standard <name>` |
//! | `object-group` | `object-group ip ...` plus `ip access-list extended <name>` |
//! | `inet6` | `ipv6 access-list <name>` |
//! | `mixed` | `extended` followed by `inet6` named `ipv6-<name>` |
//!
//! # Example
//!
//! ```ignore
//! use aclgen_cisco::{render_policy, GeneratorConfig};
//! use aclgen_policy::{policy_from_yaml, StandardServices};
//!
//! let policy = policy_from_yaml(text)?;
//! let config = GeneratorConfig::default();
//! let acl = render_policy(&policy, &config, &StandardServices::default())?;
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod filter;
pub mod generate;
pub mod object_group;
pub mod output;
pub mod renderer;
pub mod standard;
pub mod tables;
pub mod term;

pub use compiler::{FilterCompiler, RenderedFilter, RenderedTerm};
pub use config::{GeneratorConfig, ProtocolForm, DEFAULT_PLATFORM};
pub use error::{AclGenError, Result, StandardField};
pub use filter::{FilterSelection, FilterType, ALLOWED_FILTER_TYPES};
pub use generate::{generate_file, render_file, render_policy};
pub use object_group::ObjectGroups;
pub use output::assemble;
pub use renderer::{RenderContext, TermRenderer};
