//! sr-core - Core library for sqlrun
//!
//! This crate provides script discovery, the relations manifest loader,
//! the dependency planner, and the small utilities shared by the `sqlrun`
//! binary and the database layer.

pub mod checksum;
pub mod compression;
pub mod discovery;
pub mod error;
pub mod plan;
pub mod relations;
pub mod script_name;
pub mod storage_path;

pub use checksum::compute_checksum;
pub use compression::{compress, uncompress};
pub use discovery::{file_extension, walk_files};
pub use error::{CoreError, CoreResult};
pub use plan::{plan_scripts, PlanNode, ScriptEntry, ScriptForest};
pub use relations::{load_relations, Relation, RelationsManifest};
pub use script_name::ScriptName;
pub use storage_path::{bucket_name, is_gs_path};
