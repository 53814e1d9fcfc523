//! Policy model and generator services for the ACL generators.
//!
//! The generators never parse policy source themselves. They consume the
//! in-memory model defined here:
//!
//! - [`Policy`]: ordered list of [`PolicyFilter`]s (header + terms)
//! - [`Header`]: target platforms with per-platform filter options
//! - [`Term`]: one match-and-action rule with pre-resolved addresses
//!
//! and the collaborator contracts every generator relies on:
//!
//! - [`PolicyServices`]: term-name truncation, high-port rewrite, comment
//!   wrapping and the repository stamp banner
//! - [`icmp`]: ICMP type name → code tables per address family
//! - [`protocols`]: protocol name → IANA number table
//!
//! Policies are loaded from YAML or JSON with [`loader::load_policy`].

pub mod error;
pub mod icmp;
pub mod loader;
pub mod model;
pub mod protocols;
pub mod services;

pub use error::{PolicyError, PolicyResult};
pub use loader::{load_policy, policy_from_json, policy_from_yaml};
pub use model::{
    Action, AddressField, Header, Policy, PolicyFilter, PortRange, Target, Term, Verbatim,
};
pub use services::{PolicyServices, StandardServices};

pub use aclgen_types::{Address, AddressFamily, IpPrefix};
