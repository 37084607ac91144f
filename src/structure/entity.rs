//! Entities the structure layer builds paths for

use serde::{Deserialize, Serialize};

/// What an entity hangs off in the project hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityTarget {
    Shot { sequence: String, shot: String },
    AssetBuild { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TaskEntity {
    pub project: String,
    pub target: EntityTarget,
    #[serde(default)]
    pub task_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputFileEntity {
    pub project: String,
    /// Output file name, used as the `asset` placeholder
    pub name: String,
    pub revision: u32,
    pub output_type: String,
    #[serde(default)]
    pub target: Option<EntityTarget>,
    #[serde(default)]
    pub task_type: Option<String>,
}

/// An entity to place on disk, tagged by `type` when read from JSON
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum Entity {
    Task(TaskEntity),
    OutputFile(OutputFileEntity),
}

impl Entity {
    pub fn project(&self) -> &str {
        match self {
            Entity::Task(task) => &task.project,
            Entity::OutputFile(file) => &file.project,
        }
    }

    pub fn target(&self) -> Option<&EntityTarget> {
        match self {
            Entity::Task(task) => Some(&task.target),
            Entity::OutputFile(file) => file.target.as_ref(),
        }
    }

    pub fn task_type(&self) -> Option<&str> {
        match self {
            Entity::Task(task) => task.task_type.as_deref(),
            Entity::OutputFile(file) => file.task_type.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_task_from_json() {
        let entity: Entity = serde_json::from_str(
            r#"{
                "type": "Task",
                "project": "DEMO",
                "target": {"kind": "shot", "sequence": "SQ01", "shot": "SH010"},
                "task_type": "Compositing"
            }"#,
        )
        .expect("Should deserialize");
        assert_eq!(
            entity,
            Entity::Task(TaskEntity {
                project: "DEMO".to_string(),
                target: EntityTarget::Shot {
                    sequence: "SQ01".to_string(),
                    shot: "SH010".to_string(),
                },
                task_type: Some("Compositing".to_string()),
            })
        );
        assert_eq!(entity.task_type(), Some("Compositing"));
    }

    #[test]
    fn test_output_file_from_json() {
        let entity: Entity = serde_json::from_str(
            r#"{
                "type": "OutputFile",
                "project": "DEMO",
                "name": "chair",
                "revision": 4,
                "output_type": "model",
                "target": {"kind": "asset_build", "name": "props"}
            }"#,
        )
        .expect("Should deserialize");
        assert_eq!(entity.project(), "DEMO");
        assert_eq!(
            entity.target(),
            Some(&EntityTarget::AssetBuild {
                name: "props".to_string()
            })
        );
        assert_eq!(entity.task_type(), None);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: Result<Entity, _> =
            serde_json::from_str(r#"{"type": "Playlist", "project": "DEMO"}"#);
        assert!(result.is_err());
    }
}
