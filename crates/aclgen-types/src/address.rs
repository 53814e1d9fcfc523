//! Token-tagged addresses and the address-list services.
//!
//! An [`Address`] is a prefix remembered together with the network token it
//! was declared under in the policy (e.g. `INTERNAL` or `WEB_SERVERS`).
//! Object-group rendering keys its deduplication on that token.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ip::{AddressFamily, IpPrefix};

/// A resolved address with its originating declaration token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "AddressRepr")]
pub struct Address {
    /// The resolved prefix.
    #[serde(rename = "address")]
    pub prefix: IpPrefix,
    /// Network token this address was declared under, if known.
    pub token: Option<String>,
}

/// Accepts either `"10.0.0.0/8"` or `{address: "10.0.0.0/8", token: "NET"}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum AddressRepr {
    Bare(IpPrefix),
    Tagged {
        address: IpPrefix,
        #[serde(default)]
        token: Option<String>,
    },
}

impl From<AddressRepr> for Address {
    fn from(repr: AddressRepr) -> Self {
        match repr {
            AddressRepr::Bare(prefix) => Address::new(prefix),
            AddressRepr::Tagged { address, token } => Address {
                prefix: address,
                token,
            },
        }
    }
}

impl Address {
    /// Creates an untagged address.
    pub fn new(prefix: IpPrefix) -> Self {
        Self {
            prefix,
            token: None,
        }
    }

    /// Creates an address declared under `token`.
    pub fn with_token(prefix: IpPrefix, token: impl Into<String>) -> Self {
        Self {
            prefix,
            token: Some(token.into()),
        }
    }

    /// Returns the address family.
    pub fn family(&self) -> AddressFamily {
        self.prefix.family()
    }

    /// Returns true if the address covers exactly one host.
    pub fn is_host(&self) -> bool {
        self.prefix.num_hosts() == 1
    }

    /// Returns the declaration token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(token) => write!(f, "{} ({})", self.prefix, token),
            None => write!(f, "{}", self.prefix),
        }
    }
}

/// Keeps only the addresses of the given family, in order.
pub fn addresses_for_family(addresses: &[Address], family: AddressFamily) -> Vec<Address> {
    addresses
        .iter()
        .filter(|addr| addr.family() == family)
        .cloned()
        .collect()
}

/// Subtracts every exclude prefix from every address.
///
/// Remainder prefixes keep the token of the address they were carved from.
/// Addresses fully covered by an exclude disappear.
pub fn exclude_addresses(addresses: &[Address], excludes: &[Address]) -> Vec<Address> {
    let mut result = Vec::with_capacity(addresses.len());
    for addr in addresses {
        let mut pieces = vec![addr.prefix];
        for exclude in excludes {
            pieces = pieces
                .iter()
                .flat_map(|piece| piece.exclude(&exclude.prefix))
                .collect();
            if pieces.is_empty() {
                break;
            }
        }
        result.extend(pieces.into_iter().map(|prefix| Address {
            prefix,
            token: addr.token.clone(),
        }));
    }
    result
}
