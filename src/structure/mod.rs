//! Structure layer: entities and mount points in, absolute paths out
//!
//! A [`Structure`] turns a task or output-file entity into hierarchy data,
//! formats it with the location's templates and places the result under the
//! location's mount point for a given host OS.

pub mod config;
pub mod entity;
pub mod location;

use thiserror::Error;

use crate::error::TemplateError;

pub use config::{FolderTree, MountPoint, StructureConfig, TaskTypeRule, TemplateSpec, VersionFormat};
pub use entity::{Entity, EntityTarget, OutputFileEntity, TaskEntity};
pub use location::{join_mount, HostOs, Structure};

/// Errors that can occur when loading a structure or building paths with it
#[derive(Error, Debug)]
pub enum StructureError {
    #[error("Failed to read structure file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse structure TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("unknown location '{name}'")]
    UnknownLocation { name: String },
    #[error("location '{location}' has no mount point for {host}")]
    MissingMount { location: String, host: HostOs },
    #[error("entity has no task type, which a work path needs")]
    MissingTaskType,
}
