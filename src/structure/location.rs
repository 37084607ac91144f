//! A storage location: mount point, compiled templates and entity mapping

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::template::{HierarchyData, TemplateRegistry};

use super::config::{FolderTree, StructureConfig, TemplateSpec};
use super::entity::{Entity, EntityTarget};
use super::StructureError;

/// Host operating system, which decides the path separator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    Windows,
    Linux,
}

impl HostOs {
    /// The OS this binary was built for
    pub fn current() -> Self {
        if cfg!(windows) {
            HostOs::Windows
        } else {
            HostOs::Linux
        }
    }

    pub fn separator(self) -> char {
        match self {
            HostOs::Windows => '\\',
            HostOs::Linux => '/',
        }
    }

    /// Rewrite every separator to this host's
    pub fn normalize(self, path: &str) -> String {
        match self {
            HostOs::Windows => path.replace('/', "\\"),
            HostOs::Linux => path.replace('\\', "/"),
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostOs::Windows => f.write_str("windows"),
            HostOs::Linux => f.write_str("linux"),
        }
    }
}

/// Join a relative path onto a mount point with exactly one separator
pub fn join_mount(mount_point: &str, relative: &str) -> String {
    let relative = relative.trim_start_matches(['/', '\\']);
    if mount_point.is_empty() {
        relative.to_string()
    } else if mount_point.ends_with(['/', '\\']) {
        format!("{}{}", mount_point, relative)
    } else {
        format!("{}/{}", mount_point, relative)
    }
}

/// Paths for one location, built once and shared read-only afterwards
#[derive(Debug)]
pub struct Structure {
    location: String,
    host: HostOs,
    mount_point: String,
    folders: TemplateRegistry,
    folder_order: Vec<String>,
    files: TemplateRegistry,
    file_order: Vec<String>,
    config: StructureConfig,
}

fn compile(specs: &[TemplateSpec]) -> Result<(TemplateRegistry, Vec<String>), StructureError> {
    let registry =
        TemplateRegistry::from_patterns(specs.iter().map(|s| (s.name.as_str(), s.pattern.as_str())))?;
    // Later templates are the more specific ones
    let order = specs.iter().rev().map(|s| s.name.clone()).collect();
    Ok((registry, order))
}

impl Structure {
    /// Compile the templates of `config` for `location` as seen from `host`.
    ///
    /// Every template is resolved here, so a broken pattern or parent
    /// reference fails construction instead of the first path request.
    pub fn new(
        config: StructureConfig,
        location: &str,
        host: HostOs,
    ) -> Result<Self, StructureError> {
        let mount = config
            .mounts
            .get(location)
            .ok_or_else(|| StructureError::UnknownLocation {
                name: location.to_string(),
            })?;
        let mount_point = mount
            .for_host(host)
            .ok_or_else(|| StructureError::MissingMount {
                location: location.to_string(),
                host,
            })?
            .to_string();

        let (folders, folder_order) = compile(&config.templates)?;
        let (files, file_order) = compile(&config.file_templates)?;

        debug!(
            location,
            %host,
            mount_point = %mount_point,
            folder_templates = folders.len(),
            file_templates = files.len(),
            "structure ready"
        );

        Ok(Self {
            location: location.to_string(),
            host,
            mount_point,
            folders,
            folder_order,
            files,
            file_order,
            config,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn host(&self) -> HostOs {
        self.host
    }

    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    pub fn config(&self) -> &StructureConfig {
        &self.config
    }

    /// Folder templates
    pub fn templates(&self) -> &TemplateRegistry {
        &self.folders
    }

    /// Folder template names in the order they are tried
    pub fn candidates(&self) -> &[String] {
        &self.folder_order
    }

    pub fn file_templates(&self) -> &TemplateRegistry {
        &self.files
    }

    pub fn root_folders(&self) -> &FolderTree {
        &self.config.root_folders
    }

    pub fn shot_folders(&self) -> &FolderTree {
        &self.config.shot_folders
    }

    pub fn format_version(&self, revision: u32) -> String {
        self.config.version.format(revision)
    }

    /// Build the placeholder values for an entity.
    ///
    /// Values the entity cannot supply are left out, so templates that need
    /// them are skipped during selection.
    pub fn hierarchy(&self, entity: &Entity) -> HierarchyData {
        let mut data = HierarchyData::new();
        data.insert("project".to_string(), entity.project().to_string());

        if let Entity::OutputFile(file) = entity {
            data.insert("asset".to_string(), file.name.clone());
            data.insert(
                "asset_version".to_string(),
                self.format_version(file.revision),
            );
            if let Some(category) = self.config.asset_category(&file.output_type) {
                data.insert("asset_category".to_string(), category.to_string());
            }
        }

        match entity.target() {
            Some(EntityTarget::Shot { sequence, shot }) => {
                data.insert("sequence".to_string(), sequence.clone());
                data.insert("shot".to_string(), shot.clone());
            }
            Some(EntityTarget::AssetBuild { name }) => {
                data.insert("asset_build".to_string(), name.clone());
            }
            None => {}
        }

        if let Some(rule) = entity.task_type().and_then(|t| self.config.task_type(t)) {
            data.insert("task_category".to_string(), rule.category.clone());
            if let Some(folder) = &rule.folder {
                data.insert("shot_task".to_string(), folder.clone());
            }
        }

        data
    }

    /// Where the entity's published files live
    #[tracing::instrument(level = "debug", skip(self, entity), err)]
    pub fn publish_path(&self, entity: &Entity) -> Result<String, StructureError> {
        let data = self.hierarchy(entity);
        self.place(&data)
    }

    /// Where the entity's work files live: the task folder is replaced by
    /// `WORK/<task type>`
    #[tracing::instrument(level = "debug", skip(self, entity), err)]
    pub fn work_path(&self, entity: &Entity) -> Result<String, StructureError> {
        let task_type = entity.task_type().ok_or(StructureError::MissingTaskType)?;
        let mut data = self.hierarchy(entity);
        data.insert("task_category".to_string(), "WORK".to_string());
        data.insert("shot_task".to_string(), task_type.to_string());
        self.place(&data)
    }

    /// Format arbitrary data against the folder templates and place it under
    /// the mount point
    pub fn place(&self, data: &HierarchyData) -> Result<String, StructureError> {
        let relative = self.folders.format(data, &self.folder_order)?;
        Ok(self.host.normalize(&join_mount(&self.mount_point, &relative)))
    }

    /// Recover hierarchy data from a path relative to the mount point
    pub fn parse(&self, relative: &str) -> Result<HierarchyData, StructureError> {
        let relative = HostOs::Linux.normalize(relative);
        Ok(self.folders.parse(&relative, &self.folder_order)?)
    }

    /// Format a file name against the file-name templates
    pub fn file_name(&self, data: &HierarchyData) -> Result<String, StructureError> {
        Ok(self.files.format(data, &self.file_order)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::entity::{OutputFileEntity, TaskEntity};
    use pretty_assertions::assert_eq;

    fn shot_task(task_type: Option<&str>) -> Entity {
        Entity::Task(TaskEntity {
            project: "DEMO".to_string(),
            target: EntityTarget::Shot {
                sequence: "SQ01".to_string(),
                shot: "SH010".to_string(),
            },
            task_type: task_type.map(str::to_string),
        })
    }

    fn structure(host: HostOs) -> Structure {
        Structure::new(StructureConfig::default(), "long", host).expect("Should build")
    }

    #[test]
    fn test_normalize() {
        assert_eq!(HostOs::Windows.normalize("Q:/DEMO/SQ01"), "Q:\\DEMO\\SQ01");
        assert_eq!(HostOs::Linux.normalize("a\\b/c"), "a/b/c");
    }

    #[test]
    fn test_join_mount() {
        assert_eq!(join_mount("/space/features/", "DEMO"), "/space/features/DEMO");
        assert_eq!(join_mount("/space/features", "DEMO"), "/space/features/DEMO");
        assert_eq!(join_mount("Q:/", "/DEMO"), "Q:/DEMO");
        assert_eq!(join_mount("", "DEMO"), "DEMO");
    }

    #[test]
    fn test_unknown_location() {
        let result = Structure::new(StructureConfig::default(), "moon", HostOs::Linux);
        assert!(matches!(result, Err(StructureError::UnknownLocation { .. })));
    }

    #[test]
    fn test_candidates_most_specific_first() {
        let structure = structure(HostOs::Linux);
        assert_eq!(
            structure.candidates().first().map(String::as_str),
            Some("ab_asset_version_task_category")
        );
        assert_eq!(structure.candidates().last().map(String::as_str), Some("project"));
    }

    #[test]
    fn test_hierarchy_for_compositing_task() {
        let data = structure(HostOs::Linux).hierarchy(&shot_task(Some("Compositing")));
        let keys: Vec<_> = data.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["project", "sequence", "shot", "shot_task", "task_category"]
        );
        assert_eq!(data["shot_task"], "COMPS");
        assert_eq!(data["task_category"], "2D");
    }

    #[test]
    fn test_hierarchy_for_output_file() {
        let entity = Entity::OutputFile(OutputFileEntity {
            project: "DEMO".to_string(),
            name: "bg".to_string(),
            revision: 12,
            output_type: "plate".to_string(),
            target: Some(EntityTarget::Shot {
                sequence: "SQ01".to_string(),
                shot: "SH010".to_string(),
            }),
            task_type: None,
        });
        let data = structure(HostOs::Linux).hierarchy(&entity);
        assert_eq!(data["asset"], "bg");
        assert_eq!(data["asset_version"], "v012");
        assert_eq!(data["asset_category"], "PLATE");
        assert!(!data.contains_key("task_category"));
    }

    #[test]
    fn test_publish_path_for_task() {
        let path = structure(HostOs::Linux)
            .publish_path(&shot_task(Some("Compositing")))
            .unwrap();
        assert_eq!(path, "/space/features/DEMO/05_SEQUENCE/SQ01/SH010/2D/COMPS");
    }

    #[test]
    fn test_publish_path_on_windows() {
        let path = structure(HostOs::Windows)
            .publish_path(&shot_task(Some("Rotoscoping")))
            .unwrap();
        assert_eq!(
            path,
            "Q:\\DEMO\\05_SEQUENCE\\SQ01\\SH010\\2D\\ELEMENTS\\ROTOSCOPING"
        );
    }

    #[test]
    fn test_task_without_folder_falls_back_to_shot() {
        let path = structure(HostOs::Linux)
            .publish_path(&shot_task(Some("Animation")))
            .unwrap();
        assert_eq!(path, "/space/features/DEMO/05_SEQUENCE/SQ01/SH010");
    }

    #[test]
    fn test_work_path() {
        let path = structure(HostOs::Linux)
            .work_path(&shot_task(Some("Animation")))
            .unwrap();
        assert_eq!(path, "/space/features/DEMO/05_SEQUENCE/SQ01/SH010/WORK/Animation");
    }

    #[test]
    fn test_work_path_needs_task_type() {
        let result = structure(HostOs::Linux).work_path(&shot_task(None));
        assert!(matches!(result, Err(StructureError::MissingTaskType)));
    }

    #[test]
    fn test_parse_relative_path() {
        let data = structure(HostOs::Windows)
            .parse("DEMO\\04_ASSET\\props")
            .unwrap();
        assert_eq!(data["asset_build"], "props");
        assert_eq!(data["project"], "DEMO");
    }

    #[test]
    fn test_file_name() {
        let structure = structure(HostOs::Linux);
        let data: HierarchyData = [
            ("shot", "SH010"),
            ("sequence", "SQ01"),
            ("asset", "bg"),
            ("component_name", "main"),
            ("asset_version", "v003"),
            ("ext", "%04d.exr"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(
            structure.file_name(&data).unwrap(),
            "SH010_bg_main_v003.%04d.exr"
        );
    }
}
