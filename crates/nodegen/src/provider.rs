//! Cloud provider catalog and provider node dispatch.
//!
//! A provider declaration looks like `ec2 3`: the provider identifier followed
//! by an optional instance count. Each provider maps to the knife plugin verbs
//! used to create and delete its instances.

use crate::error::{Error, Result};
use crate::run_list;
use crate::types::{
    CommandPlan, GeneratorConfig, INDEX_PLACEHOLDER, ManifestContext, NodeDeclaration,
};

/// Knife verbs for one provider plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    /// Identifier used in the manifest and as the knife sub-command
    pub name: &'static str,
    /// Verb that creates an instance, e.g. `server create`
    pub create_verb: &'static str,
    /// Verb that deletes an instance, e.g. `server delete`
    pub delete_verb: &'static str,
    /// Instances can be removed with `knife node list | xargs ...`
    pub supports_bulk_delete: bool,
}

impl Provider {
    const fn server(name: &'static str) -> Self {
        Self::new(name, "server create", "server delete")
    }

    const fn new(name: &'static str, create_verb: &'static str, delete_verb: &'static str) -> Self {
        Self {
            name,
            create_verb,
            delete_verb,
            supports_bulk_delete: true,
        }
    }
}

/// Every provider the generator knows about.
pub const PROVIDERS: &[Provider] = &[
    Provider::server("bluebox"),
    Provider::server("clodo"),
    Provider::server("cs"),
    Provider::new("digital_ocean", "droplet create", "droplet destroy"),
    Provider::server("ec2"),
    Provider::server("gandi"),
    Provider::server("hp"),
    Provider::server("joyent"),
    Provider::new("kvm", "vm create", "vm delete"),
    Provider::server("linode"),
    Provider::server("lxc"),
    Provider::server("openstack"),
    Provider::server("rackspace"),
    Provider::server("slicehost"),
    Provider::server("terremark"),
    Provider::server("vagrant"),
    Provider::server("voxel"),
    Provider::new("vsphere", "vm clone", "vm delete"),
];

/// Find a provider by identifier.
pub fn lookup(name: &str) -> Option<&'static Provider> {
    PROVIDERS.iter().find(|p| p.name == name)
}

/// Check if a name is a provider identifier.
pub fn is_provider(name: &str) -> bool {
    lookup(name).is_some()
}

/// Parse an instance count the lenient way: leading digits, otherwise zero.
pub fn instance_count(count: &str) -> usize {
    let digits: String = count
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// Emit the create and delete commands for a provider declaration.
pub fn dispatch(
    node: &NodeDeclaration,
    provider: &Provider,
    count: &str,
    run_list: &str,
    context: &ManifestContext,
    config: &GeneratorConfig,
    plan: &mut CommandPlan,
) -> Result<()> {
    if config.validate && !context.has_plugin(provider.name) {
        return Err(Error::ProviderNotInstalled {
            node: node.name.clone(),
            provider: provider.name.to_string(),
        });
    }

    let flags = node.command_flags();
    let create = format!(
        "knife {}{} {} {}",
        provider.name, config.knife_options, provider.create_verb, node.options
    );
    let mut instance_names = Vec::new();

    if config.parallel {
        let mut command = format!(
            "seq {count} | parallel -u -j 0 -v \"{}",
            create.replace(INDEX_PLACEHOLDER, "{}")
        );
        run_list::append_to(&mut command, run_list);
        command.push('"');
        plan.push_create(command, flags);
    } else {
        for index in 1..=instance_count(count) {
            let index = index.to_string();
            let mut command = create.replace(INDEX_PLACEHOLDER, &index);
            run_list::append_to(&mut command, run_list);
            if let Some(template) = &node.name_template {
                instance_names.push(template.replace(INDEX_PLACEHOLDER, &index));
            }
            plan.push_create(command, flags);
        }
    }

    if config.bulk_delete && instance_names.is_empty() && provider.supports_bulk_delete {
        plan.push_delete(format!(
            "knife node{} list | xargs knife {} {} -y",
            config.knife_options, provider.name, provider.delete_verb
        ));
    } else {
        for name in &instance_names {
            plan.push_delete(format!(
                "knife {} {} -y {name}",
                provider.name, provider.delete_verb
            ));
            plan.push_node_cleanup(name, &config.knife_options);
        }
    }

    log::debug!(
        "provider '{}': {} instance(s), {} named",
        provider.name,
        count,
        instance_names.len()
    );
    Ok(())
}
