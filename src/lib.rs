//! Pipeline Paths - declarative path templates for production file trees
//!
//! Named path patterns with placeholders and parent references are compiled
//! into a [`TemplateRegistry`]; the registry formats hierarchy data into paths
//! and parses paths back into hierarchy data. A [`Structure`] binds a registry
//! to a storage location, and [`sequence`] collapses per-frame file paths into
//! a single record.
//!
//! # Example
//!
//! ```rust
//! use pipeline_paths::{HierarchyData, TemplateRegistry};
//!
//! let registry = TemplateRegistry::from_patterns([
//!     ("sequence", "{project}/05_SEQUENCE/{sequence}"),
//!     ("shot", "{@sequence}/{shot}"),
//! ])
//! .unwrap();
//!
//! let data: HierarchyData = [("project", "DEMO"), ("sequence", "SQ01"), ("shot", "SH010")]
//!     .into_iter()
//!     .map(|(k, v)| (k.to_string(), v.to_string()))
//!     .collect();
//!
//! let path = registry.format(&data, &["shot"]).unwrap();
//! assert_eq!(path, "DEMO/05_SEQUENCE/SQ01/SH010");
//! assert_eq!(registry.parse(&path, &["shot"]).unwrap(), data);
//! ```

pub mod error;
pub mod format;
pub mod parse;
pub mod sequence;
pub mod structure;
pub mod template;

pub use error::TemplateError;
pub use sequence::{collapse, FrameRecord, FrameSequence, FrameSequenceError};
pub use structure::{Entity, HostOs, Structure, StructureConfig, StructureError};
pub use template::{HierarchyData, ResolvedTemplate, Template, TemplateRegistry};
