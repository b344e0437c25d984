use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec3;

/// Role a mesh plays on the render server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshType {
    /// Baked into world space and merged with every other global mesh
    Global,
    /// Uploaded once, placed by scatter transforms
    Scatter,
    /// Uploaded on its own, only its transform changes between frames
    MovableProxy,
    /// Uploaded on its own, topology may change between frames
    ReshapableProxy,
}

/// Subdivision settings sent with every mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubdivisionParams {
    pub enabled: bool,
    pub scheme: i32,
    pub level: i32,
    /// Also known as the subdivision divider
    pub sharpness: f32,
    pub boundary_interpolation: i32,
}

impl Default for SubdivisionParams {
    fn default() -> Self {
        Self {
            enabled: false,
            scheme: 0,
            level: 0,
            sharpness: 1.0,
            boundary_interpolation: 0,
        }
    }
}

/// Visibility toggles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visibility {
    /// 0.0 hides the mesh, 1.0 is fully visible
    pub general: f32,
    pub camera: bool,
    pub shadow: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            general: 1.0,
            camera: true,
            shadow: true,
        }
    }
}

/// Curve (hair) geometry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveData {
    pub points: Vec<Vec3>,
    /// Point count of each curve
    pub vertices_per_curve: Vec<i32>,
    /// One thickness per point
    pub thickness: Vec<f32>,
    /// One material slot per curve
    pub material_index: Vec<i32>,
    /// One UV per curve
    pub uvs: Vec<Vec3>,
}

impl CurveData {
    pub fn curve_count(&self) -> usize {
        self.vertices_per_curve.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.vertices_per_curve.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.vertices_per_curve.clear();
        self.thickness.clear();
        self.material_index.clear();
        self.uvs.clear();
    }
}

/// Geometry of one scene mesh plus its sync state
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    /// Logically absent, never uploaded
    pub empty: bool,
    pub mesh_type: MeshType,

    pub points: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec3>,
    pub vertices_per_poly: Vec<i32>,
    pub points_indices: Vec<i32>,
    pub uv_indices: Vec<i32>,
    /// One material slot per polygon
    pub poly_material_index: Vec<i32>,
    /// Material slot to shader-table index
    pub used_shaders: Vec<usize>,

    pub subdivision: SubdivisionParams,
    pub curves: CurveData,
    pub visibility: Visibility,

    need_update: AtomicBool,
}

impl Mesh {
    /// New meshes start dirty so their first sync uploads them
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            empty: false,
            mesh_type: MeshType::Global,
            points: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            vertices_per_poly: Vec::new(),
            points_indices: Vec::new(),
            uv_indices: Vec::new(),
            poly_material_index: Vec::new(),
            used_shaders: Vec::new(),
            subdivision: SubdivisionParams::default(),
            curves: CurveData::default(),
            visibility: Visibility::default(),
            need_update: AtomicBool::new(true),
        }
    }

    pub fn with_type(mut self, mesh_type: MeshType) -> Self {
        self.mesh_type = mesh_type;
        self
    }

    /// Drop all geometry and shader slots
    pub fn clear(&mut self) {
        self.points.clear();
        self.normals.clear();
        self.uvs.clear();
        self.vertices_per_poly.clear();
        self.points_indices.clear();
        self.uv_indices.clear();
        self.poly_material_index.clear();
        self.used_shaders.clear();
        self.curves.clear();
    }

    /// Append a polygon. `corners` are position indices, `uv_corners` the
    /// matching UV indices.
    pub fn add_polygon(&mut self, corners: &[i32], uv_corners: &[i32], material_slot: i32) {
        self.vertices_per_poly.push(corners.len() as i32);
        self.points_indices.extend_from_slice(corners);
        self.uv_indices.extend_from_slice(uv_corners);
        self.poly_material_index.push(material_slot);
    }

    /// Append one curve with per-point thickness
    pub fn add_curve(&mut self, points: &[Vec3], thickness: &[f32], material_slot: i32, uv: Vec3) {
        self.curves.vertices_per_curve.push(points.len() as i32);
        self.curves.points.extend_from_slice(points);
        self.curves.thickness.extend_from_slice(thickness);
        self.curves.material_index.push(material_slot);
        self.curves.uvs.push(uv);
    }

    pub fn polygon_count(&self) -> usize {
        self.vertices_per_poly.len()
    }

    /// Mark the mesh as changed. Empty meshes never become dirty.
    pub fn tag_update(&self) {
        if self.empty {
            self.need_update.store(false, Ordering::Release);
            return;
        }
        self.need_update.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.need_update.load(Ordering::Acquire)
    }

    /// Consume the dirty bit. Returns whether it was set.
    pub fn take_update(&self) -> bool {
        self.need_update.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mesh_is_dirty() {
        let mesh = Mesh::new("Cube");
        assert!(mesh.is_dirty());
        assert_eq!(mesh.mesh_type, MeshType::Global);
        assert_eq!(mesh.subdivision.sharpness, 1.0);
    }

    #[test]
    fn test_take_update_clears_once() {
        let mesh = Mesh::new("Cube");
        assert!(mesh.take_update());
        assert!(!mesh.take_update());
        assert!(!mesh.is_dirty());

        mesh.tag_update();
        assert!(mesh.is_dirty());
    }

    #[test]
    fn test_empty_mesh_never_dirty() {
        let mut mesh = Mesh::new("Ghost");
        mesh.empty = true;
        mesh.tag_update();
        assert!(!mesh.is_dirty());
    }

    #[test]
    fn test_add_polygon_and_clear() {
        let mut mesh = Mesh::new("Quad");
        mesh.add_polygon(&[0, 1, 2, 3], &[0, 1, 2, 3], 0);
        mesh.add_polygon(&[0, 2, 3], &[0, 2, 3], 1);
        assert_eq!(mesh.polygon_count(), 2);
        assert_eq!(mesh.points_indices.len(), 7);
        assert_eq!(mesh.poly_material_index, vec![0, 1]);

        mesh.add_curve(&[Vec3::ZERO, Vec3::Y], &[0.1, 0.05], 0, Vec3::ZERO);
        assert_eq!(mesh.curves.curve_count(), 1);

        mesh.clear();
        assert_eq!(mesh.polygon_count(), 0);
        assert!(mesh.curves.is_empty());
        assert_eq!(mesh.name, "Quad");
    }
}
