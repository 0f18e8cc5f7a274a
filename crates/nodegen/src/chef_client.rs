//! chef-client re-run commands.
//!
//! Instead of creating nodes, chef-client mode re-runs `chef-client` on nodes
//! that already exist, selected with a knife search built from the node name,
//! environment and run list. The connection flags are recovered from the
//! node's knife options.

use crate::bootstrap::windows_protocol;
use crate::provider;
use crate::run_list;
use crate::types::{GeneratorConfig, INDEX_PLACEHOLDER, NodeDeclaration};

/// What a recognized option does to the re-run command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    Sudo,
    NoHostKeyVerify,
    /// Forwarded to `knife ssh` under the given short flag
    Forward(&'static str),
    SshUser,
    Environment,
    NodeName,
}

/// One entry of the option table.
struct Flag {
    short: Option<&'static str>,
    long: &'static str,
    takes_value: bool,
    effect: Effect,
}

impl Flag {
    const fn switch(long: &'static str, effect: Effect) -> Self {
        Self {
            short: None,
            long,
            takes_value: false,
            effect,
        }
    }

    const fn valued(short: &'static str, long: &'static str, effect: Effect) -> Self {
        Self {
            short: Some(short),
            long,
            takes_value: true,
            effect,
        }
    }

    /// Match a token against this flag's aliases.
    fn matches<'a>(&self, token: &'a str) -> Option<Match<'a>> {
        if !self.takes_value {
            return (token == self.long).then_some(Match::Switch);
        }
        if token == self.long || self.short == Some(token) {
            return Some(Match::Pending);
        }
        if let Some(value) = token.strip_prefix(self.long) {
            return Some(Match::Value(value.strip_prefix('=').unwrap_or(value)));
        }
        let value = token.strip_prefix(self.short?)?;
        Some(Match::Value(value))
    }
}

enum Match<'a> {
    Switch,
    /// Value is the next token
    Pending,
    /// Value was attached to the flag
    Value(&'a str),
}

const FLAGS: &[Flag] = &[
    Flag::switch("--sudo", Effect::Sudo),
    Flag::switch("--no-host-key-verify", Effect::NoHostKeyVerify),
    Flag::valued("-i", "--identity-file", Effect::Forward("-i")),
    Flag::valued("-G", "--ssh-gateway", Effect::Forward("-G")),
    Flag::valued("-P", "--ssh-password", Effect::Forward("-P")),
    Flag::valued("-p", "--ssh-port", Effect::Forward("-p")),
    Flag::valued("-x", "--ssh-user", Effect::SshUser),
    Flag::valued("-E", "--environment", Effect::Environment),
    Flag::valued("-N", "--node-name", Effect::NodeName),
];

/// Connection settings recovered from a node's knife options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RerunOptions {
    /// Prefix chef-client with `sudo`
    pub sudo: bool,
    /// Flags forwarded to `knife ssh`, each followed by a space
    pub protocol_options: String,
    /// Environment for the search, from `-E`
    pub environment: Option<String>,
    /// Node name override from `-N`, with `{{n}}` widened to `*`
    pub node_name: Option<String>,
}

impl RerunOptions {
    /// Scan knife options for the flags that matter to a re-run.
    ///
    /// Valued flags are accepted as `-x value`, `-xvalue`, `--ssh-user value`
    /// and `--ssh-user=value`. Unrecognized tokens are ignored.
    pub fn parse(options: &str) -> Self {
        let mut parsed = Self::default();
        let mut pending = None;

        for token in options.split_whitespace() {
            if let Some(effect) = pending.take() {
                parsed.apply(effect, token);
                continue;
            }
            for flag in FLAGS {
                match flag.matches(token) {
                    Some(Match::Switch) => parsed.apply(flag.effect, ""),
                    Some(Match::Pending) => pending = Some(flag.effect),
                    Some(Match::Value(value)) => parsed.apply(flag.effect, value),
                    None => continue,
                }
                break;
            }
        }
        parsed
    }

    fn apply(&mut self, effect: Effect, value: &str) {
        match effect {
            Effect::Sudo => self.sudo = true,
            Effect::NoHostKeyVerify => self.protocol_options.push_str("--no-host-key-verify "),
            Effect::Forward(flag) => self.protocol_options.push_str(&format!("{flag} {value} ")),
            Effect::SshUser => {
                self.protocol_options.push_str(&format!("-x {value} "));
                if value != "root" {
                    self.sudo = true;
                }
            }
            Effect::Environment => self.environment = Some(value.to_string()),
            Effect::NodeName => self.node_name = Some(value.replace(INDEX_PLACEHOLDER, "*")),
        }
    }
}

/// Build the re-run commands for one node declaration.
///
/// Produces one command per resolved node name, or a single command matching
/// on environment and run list when no literal name remains.
pub fn commands(node: &NodeDeclaration, run_list: &str, config: &GeneratorConfig) -> Vec<String> {
    let parsed = RerunOptions::parse(&node.options);

    let mut names: Vec<&str> = node.name.split_whitespace().collect();

    // the windows prefix picks the protocol even when -N renames the hosts
    let windows = names.first().copied().and_then(windows_protocol);
    if windows.is_some() {
        names.remove(0);
    }
    let protocol = windows.unwrap_or("ssh");
    let sudo = parsed.sudo && windows.is_none();

    if let Some(name) = &parsed.node_name {
        names = vec![name.as_str()];
    } else if names.first().is_some_and(|n| provider::is_provider(n)) {
        // a provider line names no host; search on run list and environment
        names.clear();
    }

    let mut protocol_options = parsed.protocol_options;
    if let Some(attribute) = &config.attribute {
        protocol_options.push_str(&format!("-a {attribute}"));
    }
    let sudo = if sudo { "sudo " } else { "" };
    let environment = parsed.environment.as_deref();

    let command = |name: Option<&str>| {
        format!(
            "knife {protocol} '{}' '{sudo}chef-client' {protocol_options} {}",
            run_list::search_query(name, run_list, environment),
            config.knife_options
        )
    };

    if names.is_empty() {
        vec![command(None)]
    } else {
        names.into_iter().map(|name| command(Some(name))).collect()
    }
}
