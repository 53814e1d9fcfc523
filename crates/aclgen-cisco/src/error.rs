//! Error types for the Cisco generator.
//!
//! Every error is terminal for the current compilation: a policy either
//! renders completely or not at all.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use aclgen_policy::PolicyError;

use crate::filter::{FilterType, ALLOWED_FILTER_TYPES};

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, AclGenError>;

/// Field a standard ACL term is not allowed to declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardField {
    Protocol,
    IcmpType,
    Address,
    Option,
    Port,
    Counter,
}

impl StandardField {
    /// Human-readable reason used in error messages.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Protocol => "Standard ACLs cannot specify protocols",
            Self::IcmpType => "ICMP Type specifications are not permissible in standard ACLs",
            Self::Address => "Standard ACLs cannot use source or destination addresses",
            Self::Option => "Standard ACLs prohibit use of options",
            Self::Port => "Standard ACLs prohibit use of port numbers",
            Self::Counter => "Counters are not implemented in standard ACLs",
        }
    }
}

impl fmt::Display for StandardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol => write!(f, "protocol"),
            Self::IcmpType => write!(f, "icmp-type"),
            Self::Address => write!(f, "address"),
            Self::Option => write!(f, "option"),
            Self::Port => write!(f, "port"),
            Self::Counter => write!(f, "counter"),
        }
    }
}

/// Errors raised while compiling a policy for Cisco.
#[derive(Debug, Error)]
pub enum AclGenError {
    /// Unknown filter type token.
    #[error(
        "access list type {filter_type} not supported by {platform} in filter {filter} (good types: {})",
        ALLOWED_FILTER_TYPES.join(", ")
    )]
    UnsupportedFilterType {
        filter: String,
        filter_type: String,
        platform: String,
    },

    /// Numeric filter name inconsistent with the IOS numbered ranges.
    #[error("filter {filter} ({filter_type}): {reason}")]
    ReservedNumericName {
        filter: String,
        filter_type: FilterType,
        reason: &'static str,
    },

    /// The header targets the platform without naming the filter.
    #[error("header targeting {platform} has no filter name")]
    MissingFilterName { platform: String },

    /// A standard ACL term declares a field the syntax forbids.
    #[error("standard access list {filter}, term {term}: {}", .field.reason())]
    StandardAclTerm {
        filter: String,
        term: String,
        field: StandardField,
    },

    /// A term cannot be rendered (no action, bad ICMP types).
    #[error("filter {filter}, term {term}: {message}")]
    InvalidTerm {
        filter: String,
        term: String,
        message: String,
    },

    /// Error raised by a policy service or the policy loader.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Generator configuration file could not be used.
    #[error("Invalid generator configuration '{path}': {message}")]
    Config { path: PathBuf, message: String },

    /// Output could not be written.
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AclGenError {
    /// Creates an invalid term error.
    pub fn invalid_term(
        filter: impl Into<String>,
        term: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidTerm {
            filter: filter.into(),
            term: term.into(),
            message: message.into(),
        }
    }

    /// Returns true for the unsupported-access-list family of errors
    /// (unknown filter type or misused numeric name).
    pub fn is_unsupported_access_list(&self) -> bool {
        matches!(
            self,
            AclGenError::UnsupportedFilterType { .. } | AclGenError::ReservedNumericName { .. }
        )
    }

    /// Returns true for standard ACL term violations.
    pub fn is_standard_acl_term(&self) -> bool {
        matches!(self, AclGenError::StandardAclTerm { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_filter_type_lists_allowed() {
        let err = AclGenError::UnsupportedFilterType {
            filter: "edge".to_string(),
            filter_type: "bogus".to_string(),
            platform: "cisco".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("access list type bogus not supported by cisco"));
        assert!(msg.contains("extended, standard, object-group, inet6, mixed"));
        assert!(err.is_unsupported_access_list());
    }

    #[test]
    fn test_standard_term_display() {
        let err = AclGenError::StandardAclTerm {
            filter: "10".to_string(),
            term: "t1".to_string(),
            field: StandardField::Protocol,
        };
        assert_eq!(
            err.to_string(),
            "standard access list 10, term t1: Standard ACLs cannot specify protocols"
        );
        assert!(err.is_standard_acl_term());
        assert!(!err.is_unsupported_access_list());
    }

    #[test]
    fn test_policy_error_is_transparent() {
        let err: AclGenError = PolicyError::invalid_term("t", "no action").into();
        assert_eq!(err.to_string(), "Invalid term 't': no action");
    }
}
