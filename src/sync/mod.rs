//! Incremental mesh upload
//!
//! `MeshManager::server_update` is the entry point. It classifies the scene,
//! uploads dirty meshes as one local batch and keeps the merged global mesh
//! on the server in step with the scene.

pub mod bake;
pub mod batch;
pub mod classify;
pub mod manager;
pub mod progress;

pub use bake::{bake_instance, build_global_batch, BakedInstance};
pub use batch::{build_local_batch, resolve_shaders, validate_mesh, MeshBatch, MeshEntry};
pub use classify::{
    classify_mesh, classify_scene, effective_role, frame_admits, Classification, MeshClass,
};
pub use manager::{MeshManager, SyncReport};
pub use progress::{Progress, SyncProgress};
