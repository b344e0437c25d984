//! Per-frame mesh classification
//!
//! Two small rule tables decide what a sync uploads: the scene policy picks
//! each mesh's effective role, and the animation mode decides which roles may
//! still change after the first frame.

use crate::scene::{AnimationMode, Mesh, MeshId, MeshPolicy, MeshType, Scene};
use crate::sync::progress::Progress;

/// Role a mesh plays this frame
pub fn effective_role(policy: MeshPolicy, mesh_type: MeshType) -> MeshType {
    match policy {
        MeshPolicy::AsIs => mesh_type,
        MeshPolicy::Global => MeshType::Global,
        MeshPolicy::Scatter => MeshType::Scatter,
        MeshPolicy::MovableProxy => MeshType::MovableProxy,
        MeshPolicy::ReshapableProxy => MeshType::ReshapableProxy,
    }
}

/// Whether geometry of `role` can have changed on a frame after the first
fn changes_after_first_frame(mode: AnimationMode, role: MeshType) -> bool {
    match (mode, role) {
        (AnimationMode::Full, _) => true,
        (AnimationMode::CamOnly, _) => false,
        (AnimationMode::MovableProxiesOnly, MeshType::ReshapableProxy) => true,
        (AnimationMode::MovableProxiesOnly, _) => false,
    }
}

/// Temporal filter: may a dirty mesh of `role` be re-sent this frame
pub fn frame_admits(mode: AnimationMode, role: MeshType, first_frame: bool) -> bool {
    first_frame || changes_after_first_frame(mode, role)
}

/// Outcome for one mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshClass {
    Skip,
    Local,
    /// Live global mesh; `contributes` when it forces a global re-send
    Global { contributes: bool },
}

/// Classify one mesh. Empty meshes lose their dirty bit here.
pub fn classify_mesh(scene: &Scene, mesh: &Mesh) -> MeshClass {
    if mesh.empty {
        mesh.take_update();
        return MeshClass::Skip;
    }

    let role = effective_role(scene.mesh_policy, mesh.mesh_type);
    let admitted = frame_admits(scene.animation_mode, role, scene.first_frame);

    match role {
        MeshType::Global => MeshClass::Global {
            contributes: mesh.is_dirty() && admitted,
        },
        _ if mesh.is_dirty() && admitted => MeshClass::Local,
        _ => MeshClass::Skip,
    }
}

/// Meshes selected for one sync
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Dirty meshes for the local batch
    pub local: Vec<MeshId>,
    /// Every live global mesh, dirty or not
    pub global: Vec<MeshId>,
    /// At least one global mesh forces a re-send of the merged mesh
    pub global_dirty: bool,
}

impl Classification {
    /// Live global meshes this frame
    pub fn live_global_count(&self) -> usize {
        self.global.len()
    }
}

/// Classify the whole scene. Returns `None` when cancelled.
pub fn classify_scene(scene: &Scene, progress: &dyn Progress) -> Option<Classification> {
    let mut plan = Classification::default();

    for (id, mesh) in scene.mesh_ids().zip(scene.meshes()) {
        match classify_mesh(scene, mesh) {
            MeshClass::Skip => continue,
            MeshClass::Local => plan.local.push(id),
            MeshClass::Global { contributes } => {
                plan.global.push(id);
                plan.global_dirty |= contributes;
            }
        }
        if progress.is_cancelled() {
            log::info!("Mesh classification cancelled");
            return None;
        }
    }

    log::debug!(
        "Classified {} local mesh(es), {} live global mesh(es), global dirty: {}",
        plan.local.len(),
        plan.global.len(),
        plan.global_dirty
    );
    Some(plan)
}
