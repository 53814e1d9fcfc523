//! Address primitives shared by the ACL generators.
//!
//! This crate provides type-safe representations of the addressing data a
//! policy term carries once network names have been resolved:
//!
//! - [`AddressFamily`]: IPv4 (`inet`) or IPv6 (`inet6`)
//! - [`IpAddress`]: IPv4 and IPv6 addresses
//! - [`IpPrefix`]: IP network prefixes (CIDR notation) with mask arithmetic
//! - [`Address`]: a prefix tagged with the network token it was declared under
//!
//! It also carries the two address-list services the renderers consume:
//! [`exclude_addresses`] and [`addresses_for_family`].

mod address;
mod ip;

pub use address::{addresses_for_family, exclude_addresses, Address};
pub use ip::{AddressFamily, IpAddress, IpPrefix};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),

    #[error("invalid address family: {0} (expected inet or inet6)")]
    InvalidAddressFamily(String),
}
