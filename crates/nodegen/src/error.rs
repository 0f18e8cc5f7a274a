//! Error types for node command generation.
//!
//! Every variant is a manifest consistency failure. Generation stops at the
//! first one, so callers never see a partially built plan.

use thiserror::Error;

/// Errors that can occur while validating node declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A `recipe[...]` entry names a cookbook that is not in the manifest
    #[error(
        "'{node}' run list cookbook '{cookbook}' is missing from the list of cookbooks in the manifest"
    )]
    UnknownCookbook {
        /// Node declaration the entry belongs to
        node: String,
        /// Cookbook referenced by the run list
        cookbook: String,
    },

    /// A `role[...]` entry names a role that is not in the manifest
    #[error("'{node}' run list role '{role}' is missing from the list of roles in the manifest")]
    UnknownRole {
        /// Node declaration the entry belongs to
        node: String,
        /// Role referenced by the run list
        role: String,
    },

    /// A run list entry is neither `recipe[...]` nor `role[...]`
    #[error("'{node}' run list '{entry}' is an invalid run list entry in the manifest")]
    InvalidRunListEntry {
        /// Node declaration the entry belongs to
        node: String,
        /// The offending entry, verbatim
        entry: String,
    },

    /// `-E <env>` names an environment that is not in the manifest
    #[error(
        "'{node}' environment '{environment}' is missing from the list of environments in the manifest"
    )]
    UnknownEnvironment {
        /// Node declaration the option belongs to
        node: String,
        /// Environment referenced by the options
        environment: String,
    },

    /// No installed knife plugin provides the provider's sub-command
    #[error(
        "'{node}' uses 'knife {provider}', which is not a currently installed plugin for knife"
    )]
    ProviderNotInstalled {
        /// Node declaration that requested the provider
        node: String,
        /// Provider identifier, e.g. `ec2`
        provider: String,
    },
}

impl Error {
    /// Name of the node declaration that failed validation.
    pub fn node(&self) -> &str {
        match self {
            Error::UnknownCookbook { node, .. }
            | Error::UnknownRole { node, .. }
            | Error::InvalidRunListEntry { node, .. }
            | Error::UnknownEnvironment { node, .. }
            | Error::ProviderNotInstalled { node, .. } => node,
        }
    }
}

/// Result type for node command generation.
pub type Result<T> = std::result::Result<T, Error>;
