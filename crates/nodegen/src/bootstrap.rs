//! Bootstrap commands for existing hosts.
//!
//! Hosts are listed on the declaration line, optionally behind a
//! `windows_<protocol>` prefix that selects `knife bootstrap windows`.

use crate::run_list;
use crate::types::{CommandPlan, GeneratorConfig, INDEX_PLACEHOLDER, NodeDeclaration};

/// Protocol named by a `windows_<protocol>` token, e.g. `winrm`.
pub fn windows_protocol(token: &str) -> Option<&str> {
    token
        .strip_prefix("windows_")
        .map(|rest| rest.split('_').next().unwrap_or(rest))
}

/// Bootstrap Windows hosts over `protocol`, one command per host.
pub fn windows(
    node: &NodeDeclaration,
    protocol: &str,
    hosts: &[&str],
    run_list: &str,
    config: &GeneratorConfig,
    plan: &mut CommandPlan,
) {
    let flags = node.command_flags();
    let options = without_sudo(&node.options);
    for host in hosts {
        let mut command = format!(
            "knife bootstrap windows {protocol}{} {host} {options}",
            config.knife_options
        );
        run_list::append_to(&mut command, run_list);
        plan.push_create(command, flags);
        plan.push_node_cleanup(host, &config.knife_options);
    }
}

/// Bootstrap plain hosts, substituting `{{n}}` with the host's 1-based index.
pub fn plain(
    node: &NodeDeclaration,
    hosts: &[&str],
    run_list: &str,
    config: &GeneratorConfig,
    plan: &mut CommandPlan,
) {
    let flags = node.command_flags();
    for (i, host) in hosts.iter().enumerate() {
        let mut command = format!("knife bootstrap{} {host} {}", config.knife_options, node.options)
            .replace(INDEX_PLACEHOLDER, &(i + 1).to_string());
        run_list::append_to(&mut command, run_list);
        plan.push_create(command, flags);
        plan.push_node_cleanup(host, &config.knife_options);
    }
}

/// Windows hosts never run under sudo.
fn without_sudo(options: &str) -> String {
    if options.split_whitespace().any(|opt| opt == "--sudo") {
        options
            .split_whitespace()
            .filter(|opt| *opt != "--sudo")
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        options.to_string()
    }
}
