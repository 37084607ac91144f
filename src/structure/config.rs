//! Structure configuration loaded from TOML
//!
//! Everything studio-specific lives here as data: mount points, template
//! patterns, the task-type lookup table and folder trees. The engine itself
//! never hardcodes any of it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::location::HostOs;
use super::StructureError;

/// Example studio layout shipped with the crate
const DEFAULT_STRUCTURE: &str = include_str!("../../structures/default.toml");

/// Root paths of one storage location, per host OS
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MountPoint {
    pub windows: Option<String>,
    pub linux: Option<String>,
}

impl MountPoint {
    pub fn for_host(&self, host: HostOs) -> Option<&str> {
        match host {
            HostOs::Windows => self.windows.as_deref(),
            HostOs::Linux => self.linux.as_deref(),
        }
    }
}

/// A named pattern as authored in the config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TemplateSpec {
    pub name: String,
    pub pattern: String,
}

/// Category and folder for one task type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TaskTypeRule {
    pub category: String,
    /// Folder under the category; task types without one only reach
    /// templates that do not need `shot_task`
    #[serde(default)]
    pub folder: Option<String>,
}

/// How revisions render as version strings (`v003`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionFormat {
    #[serde(default = "default_version_prefix")]
    pub prefix: String,
    #[serde(default = "default_version_padding")]
    pub padding: usize,
}

fn default_version_prefix() -> String {
    "v".to_string()
}

fn default_version_padding() -> usize {
    3
}

impl Default for VersionFormat {
    fn default() -> Self {
        Self {
            prefix: default_version_prefix(),
            padding: default_version_padding(),
        }
    }
}

impl VersionFormat {
    pub fn format(&self, revision: u32) -> String {
        format!("{}{:0width$}", self.prefix, revision, width = self.padding)
    }
}

/// Nested folder names; a leaf is an empty tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct FolderTree(pub BTreeMap<String, FolderTree>);

impl FolderTree {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every folder as a relative `/`-separated path, parents before children
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths("", &mut out);
        out
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for (name, children) in &self.0 {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", prefix, name)
            };
            out.push(path.clone());
            children.collect_paths(&path, out);
        }
    }
}

/// A complete structure definition
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StructureConfig {
    /// Location name -> mount point
    #[serde(default)]
    pub mounts: BTreeMap<String, MountPoint>,
    /// Folder templates, general to specific
    #[serde(default)]
    pub templates: Vec<TemplateSpec>,
    /// File-name templates, general to specific
    #[serde(default)]
    pub file_templates: Vec<TemplateSpec>,
    /// Task type name -> category and folder
    #[serde(default)]
    pub task_types: BTreeMap<String, TaskTypeRule>,
    /// Output type name -> category folder
    #[serde(default)]
    pub asset_categories: BTreeMap<String, String>,
    #[serde(default)]
    pub version: VersionFormat,
    #[serde(default)]
    pub root_folders: FolderTree,
    #[serde(default)]
    pub shot_folders: FolderTree,
}

impl StructureConfig {
    /// Load a structure from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, StructureError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a structure from a TOML string
    pub fn from_str(content: &str) -> Result<Self, StructureError> {
        Ok(toml::from_str(content)?)
    }

    /// Add or replace the mount point of a location
    pub fn with_mount(mut self, location: impl Into<String>, mount: MountPoint) -> Self {
        self.mounts.insert(location.into(), mount);
        self
    }

    /// Add or replace a task-type rule
    pub fn with_task_type(mut self, task_type: impl Into<String>, rule: TaskTypeRule) -> Self {
        self.task_types.insert(task_type.into(), rule);
        self
    }

    /// Set the version string format
    pub fn with_version(mut self, version: VersionFormat) -> Self {
        self.version = version;
        self
    }

    pub fn task_type(&self, name: &str) -> Option<&TaskTypeRule> {
        self.task_types.get(name)
    }

    pub fn asset_category(&self, output_type: &str) -> Option<&str> {
        self.asset_categories.get(output_type).map(String::as_str)
    }
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self::from_str(DEFAULT_STRUCTURE).expect("Default structure should be valid TOML")
    }
}
