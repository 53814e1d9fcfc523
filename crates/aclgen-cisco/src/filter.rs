//! Filter types and their IOS declaration vocabulary.

use std::fmt;
use std::str::FromStr;

use aclgen_types::AddressFamily;

use crate::error::{AclGenError, Result};

/// Filter type tokens accepted in the header options.
pub const ALLOWED_FILTER_TYPES: [&str; 5] = ["extended", "standard", "object-group", "inet6", "mixed"];

/// Numbered ranges IOS reserves for standard access lists.
const STANDARD_NUMBERED_RANGES: [(u32, u32); 2] = [(1, 99), (1300, 1999)];

/// A concrete syntax dialect a filter is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterType {
    Standard,
    #[default]
    Extended,
    ObjectGroup,
    Inet6,
}

impl FilterType {
    /// Address family the filter type renders for.
    pub const fn family(&self) -> AddressFamily {
        match self {
            Self::Inet6 => AddressFamily::Inet6,
            _ => AddressFamily::Inet,
        }
    }

    /// `no ...` / creation lines that reset the filter on the device.
    ///
    /// Numbered standard lists have no creation line; IOS creates them with
    /// the first rule.
    pub fn lifecycle_lines(&self, filter_name: &str) -> Vec<String> {
        match self {
            Self::Standard if is_numeric_name(filter_name) => {
                vec![format!("no access-list {}", filter_name)]
            }
            Self::Standard => vec![
                format!("no ip access-list standard {}", filter_name),
                format!("ip access-list standard {}", filter_name),
            ],
            Self::Extended | Self::ObjectGroup => vec![
                format!("no ip access-list extended {}", filter_name),
                format!("ip access-list extended {}", filter_name),
            ],
            Self::Inet6 => vec![
                format!("no ipv6 access-list {}", filter_name),
                format!("ipv6 access-list {}", filter_name),
            ],
        }
    }

    /// Prefix for the repository stamp lines.
    pub fn remark_prefix(&self, filter_name: &str) -> String {
        match self {
            Self::Standard if is_numeric_name(filter_name) => {
                format!("access-list {} remark ", filter_name)
            }
            _ => "remark ".to_string(),
        }
    }

    /// Enforces the IOS numbered-list convention for `filter_name`.
    pub fn check_numeric_name(&self, filter_name: &str) -> Result<()> {
        if !is_numeric_name(filter_name) {
            return Ok(());
        }
        let reserved = is_standard_number(filter_name);
        match self {
            Self::Extended if reserved => Err(AclGenError::ReservedNumericName {
                filter: filter_name.to_string(),
                filter_type: *self,
                reason: "Access lists between 1-99 and 1300-1999 are reserved for standard ACLs",
            }),
            Self::Standard if !reserved => Err(AclGenError::ReservedNumericName {
                filter: filter_name.to_string(),
                filter_type: *self,
                reason: "Standard access lists must be numeric in the range of 1-99 or 1300-1999.",
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Extended => write!(f, "extended"),
            Self::ObjectGroup => write!(f, "object-group"),
            Self::Inet6 => write!(f, "inet6"),
        }
    }
}

/// The filter type requested in a header; `mixed` fans out to two passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterSelection {
    Single(FilterType),
    Mixed,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self::Single(FilterType::Extended)
    }
}

impl FilterSelection {
    /// Concrete filter types rendered for this selection, in output order.
    pub fn passes(&self) -> Vec<FilterType> {
        match self {
            Self::Single(filter_type) => vec![*filter_type],
            Self::Mixed => vec![FilterType::Extended, FilterType::Inet6],
        }
    }

    /// Name used for a pass; the inet6 half of a mixed filter gets `ipv6-`.
    pub fn pass_name(&self, filter_name: &str, pass: FilterType) -> String {
        match (self, pass) {
            (Self::Mixed, FilterType::Inet6) => format!("ipv6-{}", filter_name),
            _ => filter_name.to_string(),
        }
    }
}

impl FromStr for FilterSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "extended" => Ok(Self::Single(FilterType::Extended)),
            "standard" => Ok(Self::Single(FilterType::Standard)),
            "object-group" => Ok(Self::Single(FilterType::ObjectGroup)),
            "inet6" => Ok(Self::Single(FilterType::Inet6)),
            "mixed" => Ok(Self::Mixed),
            _ => Err(format!("Unknown filter type: {}", s)),
        }
    }
}

/// Returns true if the filter name is an IOS list number.
pub fn is_numeric_name(filter_name: &str) -> bool {
    !filter_name.is_empty() && filter_name.bytes().all(|b| b.is_ascii_digit())
}

fn is_standard_number(filter_name: &str) -> bool {
    filter_name
        .parse::<u32>()
        .map(|n| STANDARD_NUMBERED_RANGES.iter().any(|(lo, hi)| (*lo..=*hi).contains(&n)))
        .unwrap_or(false)
}
