use crate::core::network::Network;
use std::net::IpAddr;
use thiserror::Error;

/*-------------------------------------------------------------------------------------------------
  Errors and Results
-------------------------------------------------------------------------------------------------*/

/// Errors raised while parsing networks, planning allocations, or walking a
/// concatenated address space. Every error is raised eagerly at the point of
/// detection; no partial allocation is ever returned alongside one.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed CIDR input or a prefix length out of range for the address family.
    #[error("invalid network '{input}': {reason}")]
    InvalidNetwork { input: String, reason: String },

    /// No eligible subnet of the requested size remains in the parent network.
    #[error("'{0}' is too small")]
    NetworkTooSmall(Network),

    /// Mutually exclusive or missing planning parameters.
    #[error("{0}")]
    Config(String),

    /// The networks passed to a concatenated lookup would need a `/0` to cover them.
    #[error("CIDRs span the entire address range")]
    SpanTooWide,

    /// An explicit prefix length was requested while mixing IPv4 and IPv6 networks.
    #[error("prefix length cannot be used when mixing v4 and v6 networks")]
    MixedFamily,

    /// The host index is beyond the size of every network in the lookup.
    #[error("No addresses found")]
    NoAddressFound,

    /// The address is outside of the network it was expected to be in.
    #[error("address '{address}' is not in network '{network}'")]
    AddressNotInNetwork { address: IpAddr, network: Network },

    /// Gap filling kept finding gaps after the maximum number of passes.
    #[error("filling the gaps in '{network}' did not finish after {passes} passes")]
    FillDidNotConverge { network: Network, passes: usize },

    /// A result could not be written out as JSON.
    #[error("unable to serialize output: {0}")]
    Serialize(#[source] serde_json::Error),

    /// An inner error with added context, e.g. the subnet group being computed.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn invalid_network(input: impl ToString, reason: impl ToString) -> Self {
        Error::InvalidNetwork {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Wrap the error with a human-readable context string.
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any [Error::Context] wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root_cause(),
            error => error,
        }
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/*--------------------------------------------------------------------------------------
  Log Error Function
--------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) fn log_error(error: &Error) {
    log::error!("{}", error);
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_too_small_message_names_the_network() {
        let error = Error::NetworkTooSmall("10.0.50.0/24".parse().unwrap());
        assert_eq!(error.to_string(), "'10.0.50.0/24' is too small");
    }

    #[test]
    fn test_context_wraps_message_and_keeps_root_cause() {
        let error = Error::NetworkTooSmall("10.0.50.0/24".parse().unwrap()).context("svc");
        log_error(&error);

        assert_eq!(error.to_string(), "svc: '10.0.50.0/24' is too small");
        assert!(matches!(error.root_cause(), Error::NetworkTooSmall(_)));
    }

    #[test]
    fn test_serialize_error_keeps_the_json_error_as_source() {
        use std::collections::BTreeMap;
        use std::error::Error as _;

        let unserializable = BTreeMap::from([((1, 2), 3)]);
        let error = Error::Serialize(serde_json::to_string(&unserializable).unwrap_err());

        assert!(error.to_string().starts_with("unable to serialize output: "));
        assert!(error.source().is_some());
    }
}
