//! Core types for node command generation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Placeholder replaced by the instance index in names and options.
pub const INDEX_PLACEHOLDER: &str = "{{n}}";

/// A single entry of the manifest's `nodes` section.
///
/// The `name` line decides how the node is created:
/// - `"ec2 3"`: a provider followed by an optional instance count
/// - `"windows_winrm host1 host2"`: Windows bootstrap over a protocol
/// - `"host1 host2"`: plain bootstrap of existing hosts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDeclaration {
    /// The declaration line (hosts, provider and count, or windows prefix)
    pub name: String,
    /// Raw run list, comma or space separated
    #[serde(default)]
    pub run_list: Option<String>,
    /// Free-text knife options, passed through untouched
    #[serde(default)]
    pub options: String,
    /// Instance name template for provider nodes, e.g. `web{{n}}`
    #[serde(default)]
    pub name_template: Option<String>,
    /// Downstream executor may ignore failures of the create commands
    #[serde(default)]
    pub allow_create_failure: Option<bool>,
    /// Downstream executor timeout for the create commands, in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Raw shell commands appended after the node's create commands
    #[serde(default)]
    pub additional_commands: Vec<String>,
}

impl NodeDeclaration {
    /// Create a declaration with only a name line.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the run list.
    pub fn with_run_list(mut self, run_list: impl Into<String>) -> Self {
        self.run_list = Some(run_list.into());
        self
    }

    /// Set the knife options.
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }

    /// Set the provider instance name template.
    pub fn with_name_template(mut self, template: impl Into<String>) -> Self {
        self.name_template = Some(template.into());
        self
    }

    /// Append a raw shell command.
    pub fn with_additional_command(mut self, command: impl Into<String>) -> Self {
        self.additional_commands.push(command.into());
        self
    }

    /// Executor flags carried onto this node's create commands.
    pub fn command_flags(&self) -> CommandFlags {
        CommandFlags {
            allow_failure: self.allow_create_failure.unwrap_or(false),
            timeout: self.timeout,
        }
    }
}

/// Names declared in the other manifest sections, plus installed plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestContext {
    /// Cookbook names from the `cookbooks` section
    pub cookbooks: BTreeSet<String>,
    /// Role names from the `roles` section
    pub roles: BTreeSet<String>,
    /// Environment names from the `environments` section
    pub environments: BTreeSet<String>,
    /// Installed knife sub-commands, e.g. `knife ec2 server create (options)`
    pub plugins: Vec<String>,
}

impl ManifestContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add known cookbooks.
    pub fn with_cookbooks<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cookbooks.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add known roles.
    pub fn with_roles<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add known environments.
    pub fn with_environments<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environments.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add installed knife plugin command lines.
    pub fn with_plugins<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plugins.extend(commands.into_iter().map(Into::into));
        self
    }

    /// Check whether some installed plugin provides `knife <provider>`.
    pub fn has_plugin(&self, provider: &str) -> bool {
        let prefix = format!("knife {provider}");
        self.plugins.iter().any(|p| p.starts_with(&prefix))
    }
}

/// Options that shape every generated command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Check run lists, environments and providers against the manifest
    pub validate: bool,
    /// Emit chef-client re-run commands instead of create/delete
    pub chef_client: bool,
    /// Delete provider nodes with a single bulk command
    pub bulk_delete: bool,
    /// Create provider instances through GNU parallel
    pub parallel: bool,
    /// Suffix appended after every knife sub-command, e.g. ` -c knife.rb`
    pub knife_options: String,
    /// Attribute passed as `-a` to chef-client re-runs
    pub attribute: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            validate: true,
            chef_client: false,
            bulk_delete: false,
            parallel: false,
            knife_options: String::new(),
            attribute: None,
        }
    }
}

/// Executor flags attached to a generated command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFlags {
    /// A failure of this command should not stop the run
    pub allow_failure: bool,
    /// Maximum run time in seconds
    pub timeout: Option<u64>,
}

/// A generated shell command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Command line, ready for `sh -c`
    pub command: String,
    /// A failure of this command should not stop the run
    #[serde(default)]
    pub allow_failure: bool,
    /// Maximum run time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Command {
    /// Create a command with the given executor flags.
    pub fn new(command: impl Into<String>, flags: CommandFlags) -> Self {
        Self {
            command: command.into(),
            allow_failure: flags.allow_failure,
            timeout: flags.timeout,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.command)
    }
}

/// Ordered create and delete commands for a whole manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPlan {
    /// Commands that create, bootstrap or re-run nodes
    pub create: Vec<Command>,
    /// Commands that tear the nodes down again
    pub delete: Vec<Command>,
}

impl CommandPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a create command.
    pub fn push_create(&mut self, command: impl Into<String>, flags: CommandFlags) {
        self.create.push(Command::new(command, flags));
    }

    /// Append a delete command.
    pub fn push_delete(&mut self, command: impl Into<String>) {
        self.delete.push(Command::new(command, CommandFlags::default()));
    }

    /// Remove the node and client objects registered for `name`.
    pub(crate) fn push_node_cleanup(&mut self, name: &str, knife_options: &str) {
        self.push_delete(format!("knife node{knife_options} delete {name} -y"));
        self.push_delete(format!("knife client{knife_options} delete {name} -y"));
    }

    /// Create command lines, in order.
    pub fn create_lines(&self) -> Vec<&str> {
        self.create.iter().map(|c| c.command.as_str()).collect()
    }

    /// Delete command lines, in order.
    pub fn delete_lines(&self) -> Vec<&str> {
        self.delete.iter().map(|c| c.command.as_str()).collect()
    }

    /// Check if the plan has no commands at all
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.delete.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_flags_from_declaration() {
        let mut node = NodeDeclaration::new("serverA");
        assert_eq!(node.command_flags(), CommandFlags::default());

        node.allow_create_failure = Some(true);
        node.timeout = Some(600);
        let flags = node.command_flags();
        assert!(flags.allow_failure);
        assert_eq!(flags.timeout, Some(600));
    }

    #[test]
    fn test_has_plugin_prefix_match() {
        let ctx = ManifestContext::new().with_plugins([
            "knife ec2 server create (options)",
            "knife vsphere vm clone VMNAME (options)",
        ]);
        assert!(ctx.has_plugin("ec2"));
        assert!(ctx.has_plugin("vsphere"));
        assert!(!ctx.has_plugin("kvm"));
    }

    #[test]
    fn test_config_defaults_validate() {
        let config: GeneratorConfig = serde_json::from_str("{}").unwrap();
        assert!(config.validate);
        assert!(!config.parallel);
        assert_eq!(config, GeneratorConfig::default());

        let config: GeneratorConfig =
            serde_json::from_str(r#"{"validate": false, "knife_options": " -c knife.rb"}"#)
                .unwrap();
        assert!(!config.validate);
        assert_eq!(config.knife_options, " -c knife.rb");
    }

    #[test]
    fn test_command_json_omits_missing_timeout() {
        let cmd = Command::new("knife node list", CommandFlags::default());
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"command":"knife node list","allow_failure":false}"#);
    }
}
