//! # nodegen
//!
//! Turns the `nodes` section of a provisioning manifest into knife command
//! lines.
//!
//! This crate provides functionality for:
//! - Normalizing and validating run lists against the manifest's cookbooks and roles
//! - Validating `-E` environments referenced by node options
//! - Creating provider instances (`knife ec2 server create`, `knife vsphere vm clone`, ...)
//! - Bootstrapping existing Linux and Windows hosts
//! - Re-running chef-client on existing nodes through a knife search
//!
//! Nothing here runs a process: the output is an ordered [`CommandPlan`] of
//! create and delete commands for some downstream executor.
//!
//! ## Example
//!
//! ```
//! use nodegen::{GeneratorConfig, ManifestContext, NodeDeclaration};
//!
//! let context = ManifestContext::new()
//!     .with_roles(["base"])
//!     .with_plugins(["knife ec2 server create (options)"]);
//!
//! let nodes = vec![
//!     NodeDeclaration::new("ec2 2")
//!         .with_run_list("role[base]")
//!         .with_options("-S key -N web{{n}}"),
//! ];
//!
//! let plan = nodegen::generate(&nodes, &context, &GeneratorConfig::default()).unwrap();
//! assert_eq!(
//!     plan.create_lines(),
//!     vec![
//!         "knife ec2 server create -S key -N web1 -r 'role[base]'",
//!         "knife ec2 server create -S key -N web2 -r 'role[base]'",
//!     ]
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bootstrap;
pub mod chef_client;
pub mod error;
pub mod generator;
pub mod options;
pub mod provider;
pub mod run_list;
pub mod types;

pub use error::{Error, Result};
pub use generator::generate;
pub use provider::{PROVIDERS, Provider};
pub use types::{
    Command, CommandFlags, CommandPlan, GeneratorConfig, ManifestContext, NodeDeclaration,
};
