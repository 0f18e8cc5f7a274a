//! Validation of free-text knife options.
//!
//! Only the environment flag is checked; the rest of the options string is
//! opaque and passed through as written.

use crate::error::{Error, Result};
use crate::types::ManifestContext;

/// Environment named by the first `-E` in the options, if any.
///
/// Both `-E prod` and `-Eprod` yield `prod`. A trailing `-E` yields `""`.
pub fn environment(options: &str) -> Option<&str> {
    let (_, after) = options.split_once("-E")?;
    Some(after.split_whitespace().next().unwrap_or_default())
}

/// Ensure `-E <env>` references an environment from the manifest.
pub fn validate(node: &str, options: &str, context: &ManifestContext) -> Result<()> {
    match environment(options) {
        Some(env) if !context.environments.contains(env) => Err(Error::UnknownEnvironment {
            node: node.to_string(),
            environment: env.to_string(),
        }),
        _ => Ok(()),
    }
}
