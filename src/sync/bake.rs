//! World-space baking for the global mesh

use std::borrow::Cow;

use glam::Vec3;

use crate::error::BridgeResult;
use crate::scene::{Mesh, MeshId, Object, Scene};
use crate::sync::batch::{resolve_shaders, validate_mesh, MeshBatch, MeshEntry};
use crate::sync::progress::Progress;

/// World-space geometry of one instance
#[derive(Debug, Clone, Default)]
pub struct BakedInstance {
    pub points: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub curve_points: Vec<Vec3>,
}

/// Geometry of `mesh` placed by `object`.
///
/// Positions and curve points get the full affine transform, normals only
/// its linear part. Normals are not renormalized.
pub fn bake_instance(mesh: &Mesh, object: &Object) -> BakedInstance {
    let place = |points: &[Vec3]| -> Vec<Vec3> {
        points.iter().map(|&point| object.transform_point(point)).collect()
    };
    BakedInstance {
        points: place(&mesh.points),
        normals: mesh
            .normals
            .iter()
            .map(|&normal| object.transform_direction(normal))
            .collect(),
        curve_points: place(&mesh.curves.points),
    }
}

/// Material slots an instance renders with
fn instance_slots<'a>(mesh: &'a Mesh, object: &'a Object) -> &'a [usize] {
    if object.used_shaders.is_empty() {
        &mesh.used_shaders
    } else {
        &object.used_shaders
    }
}

/// Build the merged global batch: one entry per instance of each mesh in
/// `ids`. Returns `None` when cancelled.
pub fn build_global_batch<'a>(
    scene: &'a Scene,
    ids: &[MeshId],
    progress: &dyn Progress,
) -> BridgeResult<Option<MeshBatch<'a>>> {
    let mut instances = Vec::new();
    for &id in ids {
        let Some(mesh) = scene.mesh(id) else {
            continue;
        };
        let objects = scene.objects_of(id);
        if objects.is_empty() {
            continue;
        }
        validate_mesh(mesh)?;
        for object in objects {
            let shaders = resolve_shaders(scene, mesh, instance_slots(mesh, object))?;
            instances.push((mesh, object, shaders));
        }
    }

    let mut entries = Vec::with_capacity(instances.len());
    for (mesh, object, shaders) in instances {
        if progress.is_cancelled() {
            log::info!("Global mesh bake cancelled after {} instance(s)", entries.len());
            return Ok(None);
        }
        let baked = bake_instance(mesh, object);
        entries.push(MeshEntry::with_geometry(
            mesh,
            shaders,
            Cow::Owned(baked.points),
            Cow::Owned(baked.normals),
            Cow::Owned(baked.curve_points),
        ));
    }

    for &id in ids {
        if let Some(mesh) = scene.mesh(id) {
            mesh.take_update();
        }
    }

    log::debug!("Baked {} global instance(s) from {} mesh(es)", entries.len(), ids.len());
    Ok(Some(MeshBatch::global(entries)))
}
