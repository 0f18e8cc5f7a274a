//! Run list handling: normalization, validation and search clauses.
//!
//! A run list is a comma-joined sequence of `recipe[cookbook]`,
//! `recipe[cookbook::recipe]` and `role[name]` entries.

use crate::error::{Error, Result};
use crate::types::ManifestContext;

/// Standardize run list formatting.
///
/// Spaces become commas and runs of commas collapse into one. `None` yields an
/// empty string. Normalizing an already normalized run list is a no-op.
pub fn normalize(run_list: Option<&str>) -> String {
    let Some(run_list) = run_list else {
        return String::new();
    };

    let mut normalized = String::with_capacity(run_list.len());
    for c in run_list.chars() {
        let c = if c == ' ' { ',' } else { c };
        if c == ',' && normalized.ends_with(',') {
            continue;
        }
        normalized.push(c);
    }
    normalized
}

/// Non-empty entries of a normalized run list, in order.
pub fn entries(run_list: &str) -> impl Iterator<Item = &str> {
    run_list.split(',').filter(|entry| !entry.is_empty())
}

/// Ensure every run list entry references a cookbook or role from the manifest.
pub fn validate(node: &str, run_list: &str, context: &ManifestContext) -> Result<()> {
    for entry in entries(run_list) {
        if let Some(rest) = entry.strip_prefix("recipe[") {
            // recipe[foo] or recipe[foo::bar]
            let cookbook = bracket_body(rest).split(':').next().unwrap_or_default();
            if !context.cookbooks.contains(cookbook) {
                return Err(Error::UnknownCookbook {
                    node: node.to_string(),
                    cookbook: cookbook.to_string(),
                });
            }
        } else if let Some(rest) = entry.strip_prefix("role[") {
            let role = bracket_body(rest);
            if !context.roles.contains(role) {
                return Err(Error::UnknownRole {
                    node: node.to_string(),
                    role: role.to_string(),
                });
            }
        } else {
            return Err(Error::InvalidRunListEntry {
                node: node.to_string(),
                entry: entry.to_string(),
            });
        }
    }
    Ok(())
}

/// Text up to the next bracket.
fn bracket_body(rest: &str) -> &str {
    let end = rest.find(['[', ']']).unwrap_or(rest.len());
    &rest[..end]
}

/// Build the node search used by chef-client re-runs.
///
/// Clauses are joined with ` and `: `name:<name>`, `chef_environment:<env>`,
/// then one clause per run list entry in run list order.
pub fn search_query(name: Option<&str>, run_list: &str, environment: Option<&str>) -> String {
    let mut clauses = Vec::new();
    if let Some(name) = name {
        clauses.push(format!("name:{name}"));
    }
    if let Some(environment) = environment {
        clauses.push(format!("chef_environment:{environment}"));
    }
    clauses.extend(entries(run_list).map(search_clause));
    clauses.join(" and ")
}

/// `recipe[apache2::ssl]` becomes `recipe:apache2\:\:ssl`.
fn search_clause(entry: &str) -> String {
    let clause = entry.replacen('[', ":", 1);
    let clause = clause.strip_suffix(']').unwrap_or(&clause);
    clause.replacen("::", "\\:\\:", 1)
}

/// Append ` -r '<run_list>'` unless the run list is empty.
pub(crate) fn append_to(command: &mut String, run_list: &str) {
    if !run_list.is_empty() {
        command.push_str(&format!(" -r '{run_list}'"));
    }
}
