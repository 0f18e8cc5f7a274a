//! Manifest-wide command generation.

use crate::bootstrap;
use crate::chef_client;
use crate::error::Result;
use crate::options;
use crate::provider;
use crate::run_list;
use crate::types::{Command, CommandPlan, GeneratorConfig, ManifestContext, NodeDeclaration};

/// Generate the create and delete commands for every node declaration.
///
/// Declarations are processed in order. The first validation failure aborts
/// the whole run and no commands are returned.
pub fn generate(
    nodes: &[NodeDeclaration],
    context: &ManifestContext,
    config: &GeneratorConfig,
) -> Result<CommandPlan> {
    let mut plan = CommandPlan::new();
    let mut reruns = Vec::new();

    for node in nodes {
        let run_list = run_list::normalize(node.run_list.as_deref());
        log::debug!(
            "node: '{}' run_list: '{}' options: '{}'",
            node.name,
            run_list,
            node.options
        );

        if config.validate {
            run_list::validate(&node.name, &run_list, context)?;
            options::validate(&node.name, &node.options, context)?;
        }

        let flags = node.command_flags();

        if config.chef_client {
            reruns.extend(
                chef_client::commands(node, &run_list, config)
                    .into_iter()
                    .map(|command| Command::new(command, flags)),
            );
            continue;
        }

        let names: Vec<&str> = node.name.split_whitespace().collect();
        let first = names.first().copied().unwrap_or_default();

        if let Some(provider) = provider::lookup(first) {
            let count = if names.len() == 2 { names[1] } else { "1" };
            provider::dispatch(node, provider, count, &run_list, context, config, &mut plan)?;
        } else if let Some(protocol) = bootstrap::windows_protocol(first) {
            bootstrap::windows(node, protocol, &names[1..], &run_list, config, &mut plan);
        } else {
            bootstrap::plain(node, &names, &run_list, config, &mut plan);
        }

        for command in &node.additional_commands {
            plan.push_create(command.as_str(), flags);
        }
    }

    if config.bulk_delete {
        plan.push_delete(format!("knife node{} bulk delete .* -y", config.knife_options));
    }

    // nodes sharing name, run list and environment re-run once
    reruns.dedup_by(|a, b| a.command == b.command);
    plan.create.extend(reruns);

    log::info!(
        "generated {} create and {} delete commands for {} nodes",
        plan.create.len(),
        plan.delete.len(),
        nodes.len()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn context() -> ManifestContext {
        ManifestContext::new()
            .with_cookbooks(["apache2", "mysql"])
            .with_roles(["base", "webserver"])
            .with_environments(["production"])
            .with_plugins(["knife ec2 server create (options)"])
    }

    fn chef_client_config() -> GeneratorConfig {
        GeneratorConfig {
            chef_client: true,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_mixed_manifest_in_order() {
        let nodes = vec![
            NodeDeclaration::new("serverA")
                .with_run_list("role[base]")
                .with_options("-i ~/.ssh/key -x user --sudo")
                .with_additional_command("knife tag create serverA web"),
            NodeDeclaration::new("ec2 2")
                .with_run_list("role[webserver] recipe[mysql::client]")
                .with_options("-S key -E production"),
            NodeDeclaration::new("windows_ssh winboxA")
                .with_run_list("role[base]")
                .with_options("-x Administrator"),
        ];

        let plan = generate(&nodes, &context(), &GeneratorConfig::default()).unwrap();

        assert_eq!(
            plan.create_lines(),
            vec![
                "knife bootstrap serverA -i ~/.ssh/key -x user --sudo -r 'role[base]'",
                "knife tag create serverA web",
                "knife ec2 server create -S key -E production -r 'role[webserver],recipe[mysql::client]'",
                "knife ec2 server create -S key -E production -r 'role[webserver],recipe[mysql::client]'",
                "knife bootstrap windows ssh winboxA -x Administrator -r 'role[base]'",
            ]
        );
        assert_eq!(
            plan.delete_lines(),
            vec![
                "knife node delete serverA -y",
                "knife client delete serverA -y",
                "knife node delete winboxA -y",
                "knife client delete winboxA -y",
            ]
        );
    }

    #[test]
    fn test_windows_hosts_bootstrap_without_sudo() {
        let nodes = vec![
            NodeDeclaration::new("windows_winrm host1 host2")
                .with_run_list("role[base]")
                .with_options("-x Administrator --sudo"),
        ];
        let plan = generate(&nodes, &context(), &GeneratorConfig::default()).unwrap();

        assert_eq!(
            plan.create_lines(),
            vec![
                "knife bootstrap windows winrm host1 -x Administrator -r 'role[base]'",
                "knife bootstrap windows winrm host2 -x Administrator -r 'role[base]'",
            ]
        );
        assert_eq!(
            plan.delete_lines(),
            vec![
                "knife node delete host1 -y",
                "knife client delete host1 -y",
                "knife node delete host2 -y",
                "knife client delete host2 -y",
            ]
        );
    }

    #[test]
    fn test_validation_failure_aborts_everything() {
        let nodes = vec![
            NodeDeclaration::new("serverA").with_run_list("role[base]"),
            NodeDeclaration::new("serverB").with_run_list("recipe[nginx]"),
            NodeDeclaration::new("serverC").with_run_list("role[base]"),
        ];
        let err = generate(&nodes, &context(), &GeneratorConfig::default()).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownCookbook {
                node: "serverB".to_string(),
                cookbook: "nginx".to_string(),
            }
        );

        let nodes = vec![NodeDeclaration::new("serverA").with_options("-E staging")];
        let err = generate(&nodes, &context(), &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownEnvironment { .. }));

        let nodes = vec![NodeDeclaration::new("openstack 2")];
        let err = generate(&nodes, &context(), &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, Error::ProviderNotInstalled { .. }));
    }

    #[test]
    fn test_validation_disabled_passes_unknown_names() {
        let nodes = vec![
            NodeDeclaration::new("serverB")
                .with_run_list("recipe[nginx]")
                .with_options("-E staging"),
            NodeDeclaration::new("openstack"),
        ];
        let config = GeneratorConfig {
            validate: false,
            ..GeneratorConfig::default()
        };
        let plan = generate(&nodes, &context(), &config).unwrap();
        assert_eq!(plan.create.len(), 2);
        assert_eq!(plan.create_lines()[1], "knife openstack server create ");
    }

    #[test]
    fn test_bulk_delete_appends_node_bulk_delete() {
        let nodes = vec![NodeDeclaration::new("ec2 3").with_run_list("role[base]")];
        let config = GeneratorConfig {
            bulk_delete: true,
            knife_options: " -c knife.rb".to_string(),
            ..GeneratorConfig::default()
        };
        let plan = generate(&nodes, &context(), &config).unwrap();
        assert_eq!(plan.create.len(), 3);
        assert_eq!(
            plan.delete_lines(),
            vec![
                "knife node -c knife.rb list | xargs knife ec2 server delete -y",
                "knife node -c knife.rb bulk delete .* -y",
            ]
        );
    }

    #[test]
    fn test_chef_client_adjacent_duplicates_collapse() {
        let nodes = vec![
            NodeDeclaration::new("ec2 2").with_run_list("role[base]").with_options("-x root"),
            NodeDeclaration::new("ec2 4").with_run_list("role[base]").with_options("-x root"),
            NodeDeclaration::new("serverA").with_run_list("role[base]").with_options("-x root"),
            NodeDeclaration::new("ec2").with_run_list("role[base]").with_options("-x root"),
        ];
        let plan = generate(&nodes, &context(), &chef_client_config()).unwrap();
        assert_eq!(
            plan.create_lines(),
            vec![
                "knife ssh 'role:base' 'chef-client' -x root  ",
                "knife ssh 'name:serverA and role:base' 'chef-client' -x root  ",
                "knife ssh 'role:base' 'chef-client' -x root  ",
            ]
        );
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn test_chef_client_skips_additional_commands() {
        let nodes = vec![
            NodeDeclaration::new("serverA serverB")
                .with_run_list("role[base]")
                .with_additional_command("echo done"),
        ];
        let plan = generate(&nodes, &context(), &chef_client_config()).unwrap();
        assert_eq!(
            plan.create_lines(),
            vec![
                "knife ssh 'name:serverA and role:base' 'chef-client'  ",
                "knife ssh 'name:serverB and role:base' 'chef-client'  ",
            ]
        );
    }

    #[test]
    fn test_empty_manifest() {
        let plan = generate(&[], &context(), &GeneratorConfig::default()).unwrap();
        assert!(plan.is_empty());
    }
}
