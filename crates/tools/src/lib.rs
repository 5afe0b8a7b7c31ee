//! Tool descriptor catalog for Confab.
//!
//! Tools here are *descriptions*, not executables: the catalog is rendered
//! into the prompt so the model knows what capabilities the surrounding
//! product offers. Descriptors are loaded once at startup from a TOML file
//! and are immutable afterwards.
//!
//! ```toml
//! [[tools]]
//! name = "mood_tracker"
//! description = "Record how the user is feeling right now"
//!
//! [[tools.parameters]]
//! name = "mood"
//! description = "A short mood word, e.g. calm, anxious"
//! required = true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use confab_core::ConfigError;

/// One parameter of a tool, as described to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,

    /// What the parameter means
    pub description: String,

    /// Whether the tool needs this parameter to be useful
    #[serde(default)]
    pub required: bool,
}

/// A single tool description. Identity is the name: the catalog rejects
/// duplicates at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name
    pub name: String,

    /// What this tool does (sent verbatim to the model)
    pub description: String,

    /// Parameters the tool accepts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ToolParameter>,
}

/// The set of tool descriptors available to the prompt builder.
///
/// Preserves file order, so prompt rendering stays deterministic across
/// restarts of the same configuration.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
}

/// On-disk shape of the catalog file.
#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// Load the catalog from a TOML file.
    ///
    /// An absent or unreadable file, malformed TOML, and duplicate or empty
    /// tool names are all fatal configuration errors. An empty catalog is
    /// fine: the prompt builder renders an explicit "no tools" block.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let file: CatalogFile = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let catalog = Self::from_descriptors(file.tools)?;
        tracing::info!(
            path = %path.display(),
            count = catalog.len(),
            "Loaded tool catalog"
        );
        Ok(catalog)
    }

    /// Build a catalog from already-parsed descriptors, enforcing the
    /// identity rules.
    pub fn from_descriptors(tools: Vec<ToolDescriptor>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for tool in &tools {
            if tool.name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "tool descriptor with an empty name".into(),
                ));
            }
            if !seen.insert(tool.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate tool name: {}",
                    tool.name
                )));
            }
        }
        Ok(Self { tools })
    }

    /// Get a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Iterate descriptors in file order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// All tool names, in file order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}
