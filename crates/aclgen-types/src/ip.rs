//! IP address and prefix types with safe parsing and mask arithmetic.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Address family of a filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum AddressFamily {
    /// IPv4.
    #[default]
    #[serde(rename = "inet")]
    Inet,
    /// IPv6.
    #[serde(rename = "inet6")]
    Inet6,
}

impl AddressFamily {
    /// Maximum prefix length for this family.
    pub const fn max_prefix_len(&self) -> u8 {
        match self {
            Self::Inet => 32,
            Self::Inet6 => 128,
        }
    }

    const fn all_ones(&self) -> u128 {
        match self {
            Self::Inet => u32::MAX as u128,
            Self::Inet6 => u128::MAX,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inet => write!(f, "inet"),
            Self::Inet6 => write!(f, "inet6"),
        }
    }
}

impl FromStr for AddressFamily {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inet" | "ipv4" | "4" => Ok(Self::Inet),
            "inet6" | "ipv6" | "6" => Ok(Self::Inet6),
            _ => Err(ParseError::InvalidAddressFamily(s.to_string())),
        }
    }
}

/// An IP address that can be either IPv4 or IPv6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpAddress {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

impl IpAddress {
    /// Returns the family of this address.
    pub const fn family(&self) -> AddressFamily {
        match self {
            IpAddress::V4(_) => AddressFamily::Inet,
            IpAddress::V6(_) => AddressFamily::Inet6,
        }
    }

    fn to_bits(self) -> u128 {
        match self {
            IpAddress::V4(addr) => u32::from(addr) as u128,
            IpAddress::V6(addr) => u128::from(addr),
        }
    }

    fn from_bits(family: AddressFamily, bits: u128) -> Self {
        match family {
            AddressFamily::Inet => IpAddress::V4(Ipv4Addr::from((bits & u32::MAX as u128) as u32)),
            AddressFamily::Inet6 => IpAddress::V6(Ipv6Addr::from(bits)),
        }
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpAddress::V4(addr) => addr.fmt(f),
            IpAddress::V6(addr) => addr.fmt(f),
        }
    }
}

impl FromStr for IpAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(':') {
            s.parse::<Ipv6Addr>()
                .map(IpAddress::V6)
                .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
        } else {
            s.parse::<Ipv4Addr>()
                .map(IpAddress::V4)
                .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
        }
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(addr: Ipv4Addr) -> Self {
        IpAddress::V4(addr)
    }
}

impl From<Ipv6Addr> for IpAddress {
    fn from(addr: Ipv6Addr) -> Self {
        IpAddress::V6(addr)
    }
}

/// An IP prefix in CIDR notation (e.g., 10.0.0.0/24 or 2001:db8::/32).
///
/// The address is kept as written; [`IpPrefix::network`] returns it with the
/// host bits cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpPrefix {
    address: IpAddress,
    prefix_len: u8,
}

impl IpPrefix {
    /// Creates a new IP prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length is invalid for the address type
    /// (>32 for IPv4, >128 for IPv6).
    pub fn new(address: IpAddress, prefix_len: u8) -> Result<Self, ParseError> {
        let max_len = address.family().max_prefix_len();
        if prefix_len > max_len {
            return Err(ParseError::InvalidIpPrefix(format!(
                "prefix length {} exceeds maximum {} for address type",
                prefix_len, max_len
            )));
        }

        Ok(IpPrefix {
            address,
            prefix_len,
        })
    }

    /// Creates a host prefix (/32 or /128) for a single address.
    pub fn host(address: IpAddress) -> Self {
        IpPrefix {
            address,
            prefix_len: address.family().max_prefix_len(),
        }
    }

    /// The all-addresses prefix (0.0.0.0/0 or ::/0).
    pub fn default_route(family: AddressFamily) -> Self {
        IpPrefix {
            address: IpAddress::from_bits(family, 0),
            prefix_len: 0,
        }
    }

    /// Returns the address as written.
    pub const fn address(&self) -> &IpAddress {
        &self.address
    }

    /// Returns the prefix length in bits.
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Returns the address family of this prefix.
    pub const fn family(&self) -> AddressFamily {
        self.address.family()
    }

    /// Returns true if this is a host route (/32 for IPv4, /128 for IPv6).
    pub const fn is_host_route(&self) -> bool {
        self.prefix_len == self.family().max_prefix_len()
    }

    /// Number of addresses covered, saturating at `u128::MAX` for ::/0.
    pub fn num_hosts(&self) -> u128 {
        let host_bits = u32::from(self.family().max_prefix_len() - self.prefix_len);
        1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
    }

    fn mask_bits(&self) -> u128 {
        let family = self.family();
        if self.prefix_len == 0 {
            return 0;
        }
        let host_bits = u32::from(family.max_prefix_len() - self.prefix_len);
        (family.all_ones() << host_bits) & family.all_ones()
    }

    /// Network address (host bits cleared).
    pub fn network(&self) -> IpAddress {
        IpAddress::from_bits(self.family(), self.address.to_bits() & self.mask_bits())
    }

    /// Netmask, e.g. `255.255.255.0` for a /24.
    pub fn netmask(&self) -> IpAddress {
        IpAddress::from_bits(self.family(), self.mask_bits())
    }

    /// Hostmask (inverse mask), e.g. `0.0.0.255` for a /24.
    pub fn hostmask(&self) -> IpAddress {
        IpAddress::from_bits(self.family(), !self.mask_bits() & self.family().all_ones())
    }

    /// Returns the prefix with host bits cleared.
    pub fn normalized(&self) -> Self {
        IpPrefix {
            address: self.network(),
            prefix_len: self.prefix_len,
        }
    }

    /// Returns true if `other` lies entirely inside this prefix.
    pub fn contains(&self, other: &IpPrefix) -> bool {
        if self.family() != other.family() || other.prefix_len < self.prefix_len {
            return false;
        }
        (other.address.to_bits() & self.mask_bits()) == self.network().to_bits()
    }

    /// Splits the prefix into its two halves. Host routes are returned as-is.
    fn halves(&self) -> (IpPrefix, IpPrefix) {
        let family = self.family();
        if self.is_host_route() {
            return (*self, *self);
        }
        let len = self.prefix_len + 1;
        let base = self.network().to_bits();
        let upper_bit = 1u128 << u32::from(family.max_prefix_len() - len);
        (
            IpPrefix {
                address: IpAddress::from_bits(family, base),
                prefix_len: len,
            },
            IpPrefix {
                address: IpAddress::from_bits(family, base | upper_bit),
                prefix_len: len,
            },
        )
    }

    /// Removes `other` from this prefix, returning the covering remainder.
    ///
    /// The result is sorted. If `other` covers this prefix the result is
    /// empty; if the two do not overlap the result is this prefix alone.
    pub fn exclude(&self, other: &IpPrefix) -> Vec<IpPrefix> {
        if !self.contains(other) {
            if other.contains(self) {
                return Vec::new();
            }
            return vec![*self];
        }

        let target = other.normalized();
        let mut remainder = Vec::new();
        let mut current = self.normalized();
        while current.prefix_len < target.prefix_len {
            let (lower, upper) = current.halves();
            if lower.contains(&target) {
                remainder.push(upper);
                current = lower;
            } else {
                remainder.push(lower);
                current = upper;
            }
        }
        remainder.sort();
        remainder
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for IpPrefix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((addr_str, len_str)) = s.rsplit_once('/') else {
            // A bare address is a host route.
            return s.parse::<IpAddress>().map(IpPrefix::host);
        };

        let address: IpAddress = addr_str.parse()?;
        let prefix_len: u8 = len_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;

        IpPrefix::new(address, prefix_len)
    }
}

impl TryFrom<String> for IpPrefix {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IpPrefix> for String {
    fn from(prefix: IpPrefix) -> Self {
        prefix.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prefix(s: &str) -> IpPrefix {
        s.parse().unwrap()
    }

    #[test]
    fn test_ip_address_discrimination() {
        let v4: IpAddress = "10.0.0.1".parse().unwrap();
        assert_eq!(v4.family(), AddressFamily::Inet);

        let v6: IpAddress = "::1".parse().unwrap();
        assert_eq!(v6.family(), AddressFamily::Inet6);
    }

    #[test]
    fn test_address_family_parse() {
        assert_eq!("inet".parse::<AddressFamily>().unwrap(), AddressFamily::Inet);
        assert_eq!("inet6".parse::<AddressFamily>().unwrap(), AddressFamily::Inet6);
        assert!("ipx".parse::<AddressFamily>().is_err());
    }

    #[test]
    fn test_ip_prefix_parse() {
        let p = prefix("10.0.0.0/24");
        assert_eq!(p.family(), AddressFamily::Inet);
        assert_eq!(p.prefix_len(), 24);

        let v6 = prefix("2001:db8::/32");
        assert_eq!(v6.family(), AddressFamily::Inet6);
        assert_eq!(v6.prefix_len(), 32);

        let bare = prefix("192.0.2.7");
        assert!(bare.is_host_route());
        assert_eq!(bare.to_string(), "192.0.2.7/32");
    }

    #[test]
    fn test_invalid_prefix_length() {
        assert!("10.0.0.0/33".parse::<IpPrefix>().is_err());
        assert!("2001:db8::/129".parse::<IpPrefix>().is_err());
        assert!("10.0.0.0/x".parse::<IpPrefix>().is_err());
    }

    #[test]
    fn test_masks_v4() {
        let p = prefix("172.16.5.9/12");
        assert_eq!(p.network().to_string(), "172.16.0.0");
        assert_eq!(p.netmask().to_string(), "255.240.0.0");
        assert_eq!(p.hostmask().to_string(), "0.15.255.255");
        assert_eq!(p.num_hosts(), 1 << 20);

        let any = prefix("0.0.0.0/0");
        assert_eq!(any.netmask().to_string(), "0.0.0.0");
        assert_eq!(any.hostmask().to_string(), "255.255.255.255");
    }

    #[test]
    fn test_masks_v6() {
        let p = prefix("2001:db8::1/64");
        assert_eq!(p.network().to_string(), "2001:db8::");
        assert_eq!(p.num_hosts(), 1u128 << 64);
        assert_eq!(prefix("::/0").num_hosts(), u128::MAX);
        assert_eq!(prefix("2001:db8::1/128").num_hosts(), 1);
    }

    #[test]
    fn test_default_route() {
        assert_eq!(IpPrefix::default_route(AddressFamily::Inet), prefix("0.0.0.0/0"));
        assert_eq!(IpPrefix::default_route(AddressFamily::Inet6), prefix("::/0"));
    }

    #[test]
    fn test_contains() {
        assert!(prefix("10.0.0.0/8").contains(&prefix("10.1.0.0/16")));
        assert!(!prefix("10.1.0.0/16").contains(&prefix("10.0.0.0/8")));
        assert!(!prefix("10.0.0.0/8").contains(&prefix("2001:db8::/32")));
    }

    #[test]
    fn test_exclude_splits_remainder() {
        let rest = prefix("10.0.0.0/24").exclude(&prefix("10.0.0.0/26"));
        let rendered: Vec<String> = rest.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["10.0.0.64/26", "10.0.0.128/25"]);
    }

    #[test]
    fn test_exclude_disjoint_and_covering() {
        let p = prefix("10.0.0.0/24");
        assert_eq!(p.exclude(&prefix("192.168.0.0/16")), vec![p]);
        assert!(p.exclude(&prefix("10.0.0.0/8")).is_empty());
        assert!(p.exclude(&p).is_empty());
    }

    #[test]
    fn test_serde_string_form() {
        let p: IpPrefix = serde_json::from_str("\"192.168.0.0/16\"").unwrap();
        assert_eq!(p, prefix("192.168.0.0/16"));
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"192.168.0.0/16\"");
    }
}
