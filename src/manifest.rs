use anyhow::{Context, Result, bail};
use nodegen::{ManifestContext, NodeDeclaration};
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A manifest list entry: `- name: { ... }` or `- name:`
type Entry<T> = BTreeMap<String, Option<T>>;

/// On-disk manifest format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
    Toml,
}

impl ManifestFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yml" | "yaml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => bail!(
                "Unsupported manifest format: {} (expected .yml, .yaml, .json or .toml)",
                path.display()
            ),
        }
    }
}

/// The sections of a manifest the generator reads
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub cookbooks: Vec<Entry<IgnoredAny>>,
    pub environments: Vec<Entry<IgnoredAny>>,
    pub roles: Vec<Entry<IgnoredAny>>,
    pub nodes: Vec<Entry<NodeBody>>,
}

/// Settings under a node's declaration line
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NodeBody {
    pub run_list: Option<String>,
    pub options: Option<String>,
    /// Instance name template for provider nodes
    pub name: Option<String>,
    pub allow_create_failure: Option<bool>,
    pub timeout: Option<u64>,
    pub additional_commands: Vec<String>,
}

impl Manifest {
    /// Load a manifest file, expanding `~` in the path
    pub fn load(path: &Path) -> Result<Self> {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);
        let format = ManifestFormat::from_path(&path)?;

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read manifest: {}", path.display()))?;
        let manifest = Self::parse(&content, format)
            .with_context(|| format!("Invalid manifest: {}", path.display()))?;

        log::debug!(
            "Loaded manifest {} with {} nodes",
            path.display(),
            manifest.nodes.len()
        );
        Ok(manifest)
    }

    /// Parse manifest content in the given format
    pub fn parse(content: &str, format: ManifestFormat) -> Result<Self> {
        let manifest: Self = match format {
            ManifestFormat::Yaml => serde_yaml::from_str(content)?,
            ManifestFormat::Json => serde_json::from_str(content)?,
            ManifestFormat::Toml => toml::from_str(content)?,
        };
        Ok(manifest)
    }

    /// Known cookbooks, roles and environments (plugins are added by the caller)
    pub fn context(&self) -> ManifestContext {
        ManifestContext::new()
            .with_cookbooks(names(&self.cookbooks))
            .with_roles(names(&self.roles))
            .with_environments(names(&self.environments))
    }

    /// Node declarations in manifest order
    pub fn node_declarations(&self) -> Vec<NodeDeclaration> {
        self.nodes
            .iter()
            .flat_map(|entry| entry.iter())
            .map(|(name, body)| {
                let mut node = NodeDeclaration::new(name.as_str());
                if let Some(body) = body {
                    node.run_list = body.run_list.clone();
                    node.options = body.options.clone().unwrap_or_default();
                    node.name_template = body.name.clone();
                    node.allow_create_failure = body.allow_create_failure;
                    node.timeout = body.timeout;
                    node.additional_commands = body.additional_commands.clone();
                }
                node
            })
            .collect()
    }
}

fn names<T>(entries: &[Entry<T>]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| entry.keys().cloned())
        .collect()
}
