//! The policy model consumed by the generators.
//!
//! A [`Policy`] is an ordered list of filters, each a [`Header`] followed by
//! an ordered list of [`Term`]s. Addresses are already resolved from network
//! tokens; generators only read this model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use aclgen_types::{addresses_for_family, Address, AddressFamily};

/// Term action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Accept,
    Deny,
    Reject,
    RejectWithTcpRst,
    Next,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Deny => write!(f, "deny"),
            Self::Reject => write!(f, "reject"),
            Self::RejectWithTcpRst => write!(f, "reject-with-tcp-rst"),
            Self::Next => write!(f, "next"),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "deny" => Ok(Self::Deny),
            "reject" => Ok(Self::Reject),
            "reject-with-tcp-rst" => Ok(Self::RejectWithTcpRst),
            "next" => Ok(Self::Next),
            _ => Err(format!("Unknown term action: {}", s)),
        }
    }
}

/// Inclusive L4 port range. A single port has `low == high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "PortRepr", into = "(u16, u16)")]
pub struct PortRange {
    pub low: u16,
    pub high: u16,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortRepr {
    Single(u16),
    Pair((u16, u16)),
}

impl From<PortRepr> for PortRange {
    fn from(repr: PortRepr) -> Self {
        match repr {
            PortRepr::Single(port) => PortRange::single(port),
            PortRepr::Pair((low, high)) => PortRange::new(low, high),
        }
    }
}

impl From<PortRange> for (u16, u16) {
    fn from(range: PortRange) -> Self {
        (range.low, range.high)
    }
}

impl PortRange {
    /// Creates a range `low..=high`.
    pub const fn new(low: u16, high: u16) -> Self {
        Self { low, high }
    }

    /// Creates a single-port range.
    pub const fn single(port: u16) -> Self {
        Self {
            low: port,
            high: port,
        }
    }

    /// Returns true if the range covers one port.
    pub const fn is_single(&self) -> bool {
        self.low == self.high
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Literal text for one platform, bypassing rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verbatim {
    pub platform: String,
    pub text: String,
}

/// Address list selector for [`Term::addresses_for_family`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Address,
    AddressExclude,
    Source,
    SourceExclude,
    Destination,
    DestinationExclude,
}

/// One named match-and-action rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Term {
    pub name: String,
    pub action: Vec<Action>,
    pub protocol: Vec<String>,
    pub address: Vec<Address>,
    pub address_exclude: Vec<Address>,
    pub source_address: Vec<Address>,
    pub source_address_exclude: Vec<Address>,
    pub destination_address: Vec<Address>,
    pub destination_address_exclude: Vec<Address>,
    pub source_port: Vec<PortRange>,
    pub destination_port: Vec<PortRange>,
    pub icmp_type: Vec<String>,
    pub option: Vec<String>,
    pub verbatim: Vec<Verbatim>,
    pub owner: Option<String>,
    pub platform: Vec<String>,
    pub platform_exclude: Vec<String>,
    pub expiration: Option<NaiveDate>,
    pub logging: bool,
    pub comment: Vec<String>,
    pub counter: Option<String>,
}

impl Term {
    /// Creates an empty term named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The effective action; only the first declared action is used.
    pub fn primary_action(&self) -> Option<Action> {
        self.action.first().copied()
    }

    /// Returns true if `option` is declared on the term.
    pub fn has_option(&self, option: &str) -> bool {
        self.option.iter().any(|o| o == option)
    }

    /// Returns true if the term must not be rendered for `platform`.
    pub fn excludes_platform(&self, platform: &str) -> bool {
        let not_included = !self.platform.is_empty() && !self.platform.iter().any(|p| p == platform);
        let excluded = self.platform_exclude.iter().any(|p| p == platform);
        not_included || excluded
    }

    /// Verbatim text tagged for `platform`, in declaration order.
    pub fn verbatim_for<'a>(&'a self, platform: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.verbatim
            .iter()
            .filter(move |v| v.platform == platform)
            .map(|v| v.text.as_str())
    }

    /// Returns the declared list for `field`.
    pub fn address_list(&self, field: AddressField) -> &[Address] {
        match field {
            AddressField::Address => &self.address,
            AddressField::AddressExclude => &self.address_exclude,
            AddressField::Source => &self.source_address,
            AddressField::SourceExclude => &self.source_address_exclude,
            AddressField::Destination => &self.destination_address,
            AddressField::DestinationExclude => &self.destination_address_exclude,
        }
    }

    /// Addresses of `field` belonging to `family`.
    pub fn addresses_for_family(&self, field: AddressField, family: AddressFamily) -> Vec<Address> {
        addresses_for_family(self.address_list(field), family)
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action.push(action);
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol.push(protocol.into());
        self
    }

    pub fn with_source_address(mut self, address: Address) -> Self {
        self.source_address.push(address);
        self
    }

    pub fn with_destination_address(mut self, address: Address) -> Self {
        self.destination_address.push(address);
        self
    }

    pub fn with_source_port(mut self, low: u16, high: u16) -> Self {
        self.source_port.push(PortRange::new(low, high));
        self
    }

    pub fn with_destination_port(mut self, low: u16, high: u16) -> Self {
        self.destination_port.push(PortRange::new(low, high));
        self
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option.push(option.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment.push(comment.into());
        self
    }
}

/// One platform target line of a header: the platform plus its options.
///
/// For the Cisco generator `options[0]` is the filter name and `options[1]`,
/// when present, selects the filter type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
    pub platform: String,
    pub options: Vec<String>,
}

impl Target {
    pub fn new<I, S>(platform: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            platform: platform.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }
}

/// Filter header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    #[serde(rename = "target")]
    pub targets: Vec<Target>,
    pub comment: Vec<String>,
}

impl Header {
    /// Platforms this header targets.
    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.platform.as_str())
    }

    /// Returns true if the header targets `platform`.
    pub fn targets_platform(&self, platform: &str) -> bool {
        self.platforms().any(|p| p == platform)
    }

    /// Filter options for `platform`, including the filter name at index 0.
    pub fn filter_options(&self, platform: &str) -> &[String] {
        self.targets
            .iter()
            .find(|t| t.platform == platform)
            .map(|t| t.options.as_slice())
            .unwrap_or(&[])
    }

    /// Filter name for `platform`.
    pub fn filter_name(&self, platform: &str) -> Option<&str> {
        self.filter_options(platform).first().map(String::as_str)
    }
}

/// A header and its terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyFilter {
    pub header: Header,
    pub terms: Vec<Term>,
}

/// An ordered collection of filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub filters: Vec<PolicyFilter>,
}

impl Policy {
    /// Filters whose header targets `platform`, in policy order.
    pub fn filters_for<'a>(&'a self, platform: &'a str) -> impl Iterator<Item = &'a PolicyFilter> + 'a {
        self.filters
            .iter()
            .filter(move |f| f.header.targets_platform(platform))
    }
}
