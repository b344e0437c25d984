//! Geometry batches
//!
//! A `MeshBatch` is one `LoadLocalMesh` or `LoadGlobalMesh` message worth of
//! meshes. Entries are views: local entries borrow the scene's buffers, global
//! entries own their baked positions, normals and curve points and borrow
//! everything else.
//!
//! Wire layout of the payload, each section repeated per entry in order:
//! entry count, ten `u64` buffer sizes, geometry, indices and flags, strings.

use std::borrow::Cow;

use glam::Vec3;

use crate::error::{BridgeError, BridgeResult};
use crate::network::protocol::{
    Protocol, BOOL_SIZE, F32_SIZE, GLOBAL_MESH_NAME, I32_SIZE, U64_SIZE, VEC3_SIZE,
};
use crate::network::{PacketType, PacketWriter};
use crate::scene::{CurveData, Mesh, MeshId, Scene, SubdivisionParams, Visibility};
use crate::sync::progress::Progress;

/// Number of `u64` size fields leading each entry
const SIZE_FIELDS: u64 = 10;

/// One mesh inside a batch
#[derive(Debug, Clone)]
pub struct MeshEntry<'a> {
    pub name: &'a str,
    pub shader_names: Vec<&'a str>,
    pub points: Cow<'a, [Vec3]>,
    pub normals: Cow<'a, [Vec3]>,
    pub uvs: &'a [Vec3],
    pub vertices_per_poly: &'a [i32],
    pub points_indices: &'a [i32],
    pub uv_indices: &'a [i32],
    pub poly_material_index: &'a [i32],
    pub curve_points: Cow<'a, [Vec3]>,
    pub curves: &'a CurveData,
    pub subdivision: SubdivisionParams,
    pub visibility: Visibility,
}

impl<'a> MeshEntry<'a> {
    /// View over a mesh's own buffers, nothing is copied
    pub fn borrowed(mesh: &'a Mesh, shader_names: Vec<&'a str>) -> Self {
        Self::with_geometry(
            mesh,
            shader_names,
            Cow::Borrowed(&mesh.points),
            Cow::Borrowed(&mesh.normals),
            Cow::Borrowed(&mesh.curves.points),
        )
    }

    /// View over a mesh with replacement positions, normals and curve
    /// points. Curve thickness, UVs and counts still come from `mesh`.
    pub fn with_geometry(
        mesh: &'a Mesh,
        shader_names: Vec<&'a str>,
        points: Cow<'a, [Vec3]>,
        normals: Cow<'a, [Vec3]>,
        curve_points: Cow<'a, [Vec3]>,
    ) -> Self {
        Self {
            name: &mesh.name,
            shader_names,
            points,
            normals,
            uvs: &mesh.uvs,
            vertices_per_poly: &mesh.vertices_per_poly,
            points_indices: &mesh.points_indices,
            uv_indices: &mesh.uv_indices,
            poly_material_index: &mesh.poly_material_index,
            curve_points,
            curves: &mesh.curves,
            subdivision: mesh.subdivision,
            visibility: mesh.visibility,
        }
    }

    pub fn polygon_count(&self) -> usize {
        self.vertices_per_poly.len()
    }

    /// Bytes this entry adds to the payload
    fn payload_size(&self, with_name: bool) -> u64 {
        let curves = self.curves;
        let vec3_count = self.points.len()
            + self.normals.len()
            + self.uvs.len()
            + self.curve_points.len()
            + curves.uvs.len();
        let i32_count = self.points_indices.len()
            + self.vertices_per_poly.len()
            + self.poly_material_index.len()
            + self.uv_indices.len()
            + curves.vertices_per_curve.len()
            + curves.material_index.len();

        let mut size = SIZE_FIELDS * U64_SIZE
            + vec3_count as u64 * VEC3_SIZE
            + curves.thickness.len() as u64 * F32_SIZE
            + F32_SIZE * 2
            + i32_count as u64 * I32_SIZE
            + BOOL_SIZE * 3
            + I32_SIZE * 3;

        if with_name {
            size += Protocol::string_field_len(self.name);
        }
        size + self
            .shader_names
            .iter()
            .map(|shader| Protocol::string_field_len(shader))
            .sum::<u64>()
    }

    fn write_sizes(&self, packet: &mut PacketWriter) {
        packet.write_u64(self.points.len() as u64);
        packet.write_u64(self.normals.len() as u64);
        packet.write_u64(self.points_indices.len() as u64);
        // normals are per vertex, never indexed
        packet.write_u64(0);
        packet.write_u64(self.vertices_per_poly.len() as u64);
        packet.write_u64(self.uvs.len() as u64);
        packet.write_u64(self.uv_indices.len() as u64);
        packet.write_u64(self.shader_names.len() as u64);
        packet.write_u64(self.curve_points.len() as u64);
        packet.write_u64(self.curves.curve_count() as u64);
    }

    fn write_geometry(&self, packet: &mut PacketWriter) {
        packet.write_vec3_slice(&self.points);
        packet.write_vec3_slice(&self.normals);
        packet.write_vec3_slice(self.uvs);
        packet.write_vec3_slice(&self.curve_points);
        packet.write_f32_slice(&self.curves.thickness);
        packet.write_vec3_slice(&self.curves.uvs);
        packet.write_f32(self.subdivision.sharpness);
        packet.write_f32(self.visibility.general);
    }

    fn write_indices(&self, packet: &mut PacketWriter) {
        packet.write_i32_slice(self.points_indices);
        packet.write_i32_slice(self.vertices_per_poly);
        packet.write_i32_slice(self.poly_material_index);
        packet.write_i32_slice(self.uv_indices);
        packet.write_i32_slice(&self.curves.vertices_per_curve);
        packet.write_i32_slice(&self.curves.material_index);
        packet.write_bool(self.subdivision.enabled);
        packet.write_i32(self.subdivision.scheme);
        packet.write_i32(self.subdivision.level);
        packet.write_i32(self.subdivision.boundary_interpolation);
        packet.write_bool(self.visibility.camera);
        packet.write_bool(self.visibility.shadow);
    }

    fn write_strings(&self, packet: &mut PacketWriter, with_name: bool) {
        if with_name {
            packet.write_str(self.name);
        }
        for shader in &self.shader_names {
            packet.write_str(shader);
        }
    }
}

/// One mesh upload message
#[derive(Debug, Clone)]
pub struct MeshBatch<'a> {
    global: bool,
    entries: Vec<MeshEntry<'a>>,
}

impl<'a> MeshBatch<'a> {
    /// Individually named meshes
    pub fn local(entries: Vec<MeshEntry<'a>>) -> Self {
        Self {
            global: false,
            entries,
        }
    }

    /// Instances merged into the single global mesh
    pub fn global(entries: Vec<MeshEntry<'a>>) -> Self {
        Self {
            global: true,
            entries,
        }
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn entries(&self) -> &[MeshEntry<'a>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn packet_type(&self) -> PacketType {
        PacketType::load_mesh(self.global)
    }

    /// Name carried in the packet's name block. Local batches are named
    /// after their first entry.
    pub fn packet_name(&self) -> &str {
        if self.global {
            return GLOBAL_MESH_NAME;
        }
        self.entries.first().map(|entry| entry.name).unwrap_or("")
    }

    /// Exact payload size excluding the name block
    pub fn payload_size(&self) -> u64 {
        let with_name = !self.global;
        U64_SIZE
            + self
                .entries
                .iter()
                .map(|entry| entry.payload_size(with_name))
                .sum::<u64>()
    }

    /// Encode the whole batch into one frame builder
    pub fn to_packet(&self) -> PacketWriter {
        let with_name = !self.global;
        let mut packet =
            PacketWriter::new(self.packet_type(), self.payload_size(), Some(self.packet_name()));

        packet.write_u64(self.entries.len() as u64);
        for entry in &self.entries {
            entry.write_sizes(&mut packet);
        }
        for entry in &self.entries {
            entry.write_geometry(&mut packet);
        }
        for entry in &self.entries {
            entry.write_indices(&mut packet);
        }
        for entry in &self.entries {
            entry.write_strings(&mut packet, with_name);
        }
        packet
    }
}

fn invalid(mesh: &Mesh, reason: impl Into<String>) -> BridgeError {
    BridgeError::InvalidMesh {
        name: mesh.name.clone(),
        reason: reason.into(),
    }
}

fn index_sum(counts: &[i32]) -> Option<usize> {
    counts
        .iter()
        .try_fold(0usize, |acc, &count| usize::try_from(count).ok().map(|c| acc + c))
}

/// Check that a mesh carries everything the remote engine needs
pub fn validate_mesh(mesh: &Mesh) -> BridgeResult<()> {
    let curves = &mesh.curves;
    let curve_only = mesh.vertices_per_poly.is_empty() && curves.curve_count() > 0;

    if !curve_only {
        if mesh.points.is_empty() {
            return Err(invalid(mesh, "no points"));
        }
        if mesh.vertices_per_poly.is_empty() {
            return Err(invalid(mesh, "no polygons"));
        }
        if index_sum(&mesh.vertices_per_poly) != Some(mesh.points_indices.len()) {
            return Err(invalid(mesh, "point indices do not match polygon sizes"));
        }
        if mesh.poly_material_index.len() != mesh.vertices_per_poly.len() {
            return Err(invalid(mesh, "missing per-polygon material index"));
        }
        if !mesh.subdivision.enabled {
            if mesh.normals.is_empty() {
                return Err(invalid(mesh, "no normals"));
            }
            if mesh.uvs.is_empty() || mesh.uv_indices.is_empty() {
                return Err(invalid(mesh, "no UVs"));
            }
        }
        if !mesh.uv_indices.is_empty() && mesh.uv_indices.len() != mesh.points_indices.len() {
            return Err(invalid(mesh, "UV indices do not match point indices"));
        }
    }

    if index_sum(&curves.vertices_per_curve) != Some(curves.points.len()) {
        return Err(invalid(mesh, "curve points do not match curve sizes"));
    }
    if curves.thickness.len() != curves.points.len() {
        return Err(invalid(mesh, "curve thickness count differs from curve points"));
    }
    let curve_count = curves.curve_count();
    if curves.material_index.len() != curve_count || curves.uvs.len() != curve_count {
        return Err(invalid(mesh, "curve material or UV count differs from curve count"));
    }
    Ok(())
}

/// Resolve material slots to shader names
pub fn resolve_shaders<'a>(
    scene: &'a Scene,
    mesh: &Mesh,
    slots: &[usize],
) -> BridgeResult<Vec<&'a str>> {
    slots
        .iter()
        .map(|&slot| {
            scene
                .shader_name(slot)
                .ok_or_else(|| invalid(mesh, format!("shader slot {} does not resolve", slot)))
        })
        .collect()
}

/// Build the local batch for `ids`.
///
/// Every mesh is validated before the first dirty bit is consumed, so a
/// rejected selection leaves the scene untouched. Returns `None` when
/// cancelled part way through filling the batch.
pub fn build_local_batch<'a>(
    scene: &'a Scene,
    ids: &[MeshId],
    progress: &dyn Progress,
) -> BridgeResult<Option<MeshBatch<'a>>> {
    let mut selected = Vec::with_capacity(ids.len());
    for &id in ids {
        let Some(mesh) = scene.mesh(id) else {
            log::warn!("Mesh {:?} vanished from the scene before upload", id);
            continue;
        };
        validate_mesh(mesh)?;
        Protocol::validate_entity_name(&mesh.name).map_err(|reason| invalid(mesh, reason))?;
        let shaders = resolve_shaders(scene, mesh, &mesh.used_shaders)?;
        selected.push((mesh, shaders));
    }

    let mut entries = Vec::with_capacity(selected.len());
    for (mesh, shaders) in selected {
        if progress.is_cancelled() {
            log::info!("Local mesh upload cancelled after {} mesh(es)", entries.len());
            return Ok(None);
        }
        progress.set_status("Loading Meshes to render-server", &format!("Mesh: {}", mesh.name));
        mesh.take_update();
        entries.push(MeshEntry::borrowed(mesh, shaders));
    }

    Ok(Some(MeshBatch::local(entries)))
}
