//! Mesh manager
//!
//! Drives one incremental upload per frame: classify, send the local batch,
//! send or delete the merged global mesh.

use crate::error::BridgeResult;
use crate::network::protocol::GLOBAL_MESH_NAME;
use crate::network::RenderServer;
use crate::scene::{Mesh, MeshType, Scene};
use crate::sync::bake::build_global_batch;
use crate::sync::batch::build_local_batch;
use crate::sync::classify::{classify_scene, frame_admits};
use crate::sync::progress::Progress;

const MESH_STATUS: &str = "Loading Meshes to render-server";
const GLOBAL_STATUS: &str = "Loading global Mesh to render-server";
const TRANSFERRING: &str = "Transferring...";

/// What one `server_update` did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Meshes sent in the local batch
    pub local_meshes: usize,
    /// Instances merged into the global batch
    pub global_instances: usize,
    /// The merged global mesh was deleted on the server
    pub global_deleted: bool,
    pub cancelled: bool,
}

impl SyncReport {
    fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }
}

/// Tracks what has to be re-sent and performs the upload
#[derive(Debug)]
pub struct MeshManager {
    need_update: bool,
    need_global_update: bool,
}

impl Default for MeshManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshManager {
    /// A fresh manager syncs on its first call
    pub fn new() -> Self {
        Self {
            need_update: true,
            need_global_update: false,
        }
    }

    /// Request a sync on the next call
    pub fn tag_update(&mut self) {
        self.need_update = true;
    }

    /// Force the merged global mesh to be rebuilt
    pub fn tag_global_update(&mut self) {
        self.need_update = true;
        self.need_global_update = true;
    }

    /// Mark one mesh as changed and request a sync
    pub fn tag_mesh_update(&mut self, mesh: &Mesh) {
        mesh.tag_update();
        self.need_update = true;
    }

    pub fn need_update(&self) -> bool {
        self.need_update
    }

    pub fn need_global_update(&self) -> bool {
        self.need_global_update
    }

    /// Upload everything that changed since the last call.
    ///
    /// Errors stop the update at the failing message; meshes already sent
    /// stay clean.
    pub fn server_update(
        &mut self,
        server: &RenderServer,
        scene: &Scene,
        progress: &dyn Progress,
    ) -> BridgeResult<SyncReport> {
        let mut report = SyncReport::default();
        if !self.need_update {
            return Ok(report);
        }
        self.need_update = false;
        let global_requested = std::mem::take(&mut self.need_global_update);

        progress.set_status(MESH_STATUS, "");

        let Some(plan) = classify_scene(scene, progress) else {
            return Ok(report.cancelled());
        };

        if !plan.local.is_empty() {
            let Some(batch) = build_local_batch(scene, &plan.local, progress)? else {
                return Ok(report.cancelled());
            };
            progress.set_status(MESH_STATUS, TRANSFERRING);
            server.load_mesh(&batch)?;
            report.local_meshes = batch.len();
            log::info!("Uploaded {} local mesh(es)", batch.len());
        }

        let global_forced = global_requested
            && frame_admits(scene.animation_mode, MeshType::Global, scene.first_frame);

        if plan.live_global_count() == 0 {
            server.delete_mesh(true, GLOBAL_MESH_NAME)?;
            report.global_deleted = true;
        } else if plan.global_dirty || global_forced {
            progress.set_status(GLOBAL_STATUS, "");
            let Some(batch) = build_global_batch(scene, &plan.global, progress)? else {
                return Ok(report.cancelled());
            };
            if !batch.is_empty() {
                progress.set_status(GLOBAL_STATUS, TRANSFERRING);
                server.load_mesh(&batch)?;
                report.global_instances = batch.len();
                log::info!("Uploaded global mesh with {} instance(s)", batch.len());
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::progress::SyncProgress;

    #[test]
    fn test_manager_flags() {
        let mut manager = MeshManager::new();
        assert!(manager.need_update());
        assert!(!manager.need_global_update());

        manager.tag_global_update();
        assert!(manager.need_global_update());
    }

    #[test]
    fn test_nothing_to_do_when_clean() {
        let mut manager = MeshManager::new();
        let server = RenderServer::disconnected();
        let scene = Scene::new();
        let progress = SyncProgress::new();

        let report = manager.server_update(&server, &scene, &progress).unwrap();
        assert!(report.global_deleted);
        assert!(!manager.need_update());

        let report = manager.server_update(&server, &scene, &progress).unwrap();
        assert_eq!(report, SyncReport::default());
    }

    #[test]
    fn test_tag_mesh_update() {
        let mut manager = MeshManager::new();
        let server = RenderServer::disconnected();
        let mut scene = Scene::new();
        let id = scene.add_mesh(Mesh::new("Empty").with_type(MeshType::Scatter));
        scene.mesh_mut(id).unwrap().empty = true;

        manager.server_update(&server, &scene, &SyncProgress::new()).unwrap();
        manager.tag_mesh_update(scene.mesh(id).unwrap());
        assert!(manager.need_update());
        // empty meshes never turn dirty
        assert!(!scene.mesh(id).unwrap().is_dirty());
    }

    #[test]
    fn test_cancelled_update() {
        let mut manager = MeshManager::new();
        let server = RenderServer::disconnected();
        let mut scene = Scene::new();
        scene.add_mesh(Mesh::new("A").with_type(MeshType::Scatter));
        let progress = SyncProgress::new();
        progress.cancel();

        let report = manager.server_update(&server, &scene, &progress).unwrap();
        assert!(report.cancelled);
        assert!(!report.global_deleted);
        assert!(scene.meshes()[0].is_dirty());
    }
}
