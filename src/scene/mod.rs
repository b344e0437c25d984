//! Scene data handed over by the host
//!
//! The bridge does not walk the host scene graph. The host fills a `Scene`
//! with meshes, the objects instancing them and the shader table, then asks
//! the mesh manager to sync.

pub mod mesh;
pub mod object;

use std::collections::BTreeMap;

pub use mesh::{CurveData, Mesh, MeshType, SubdivisionParams, Visibility};
pub use object::{affine_from_rows_3x4, affine_to_rows_3x4, Object};

/// Index of a mesh in its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshId(pub usize);

/// Scene-wide classification policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshPolicy {
    /// Each mesh keeps its own `mesh_type`
    AsIs,
    Global,
    Scatter,
    MovableProxy,
    ReshapableProxy,
}

/// Which parts of the scene may change after the first frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationMode {
    Full,
    CamOnly,
    MovableProxiesOnly,
}

/// Meshes, their instances and the settings that drive a sync
#[derive(Debug)]
pub struct Scene {
    meshes: Vec<Mesh>,
    objects: BTreeMap<MeshId, Vec<Object>>,
    shaders: Vec<String>,
    pub mesh_policy: MeshPolicy,
    pub animation_mode: AnimationMode,
    pub first_frame: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            meshes: Vec::new(),
            objects: BTreeMap::new(),
            shaders: Vec::new(),
            mesh_policy: MeshPolicy::AsIs,
            animation_mode: AnimationMode::Full,
            first_frame: true,
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    /// Register an instance of a mesh
    pub fn add_object(&mut self, mesh: MeshId, object: Object) {
        self.objects.entry(mesh).or_default().push(object);
    }

    /// Register a shader name, returning its table index
    pub fn add_shader(&mut self, name: impl Into<String>) -> usize {
        self.shaders.push(name.into());
        self.shaders.len() - 1
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.0)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh_ids(&self) -> impl Iterator<Item = MeshId> {
        (0..self.meshes.len()).map(MeshId)
    }

    /// Instances of one mesh, in insertion order
    pub fn objects_of(&self, mesh: MeshId) -> &[Object] {
        self.objects.get(&mesh).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All instanced meshes in `MeshId` order
    pub fn objects(&self) -> impl Iterator<Item = (MeshId, &[Object])> {
        self.objects.iter().map(|(id, objects)| (*id, objects.as_slice()))
    }

    pub fn objects_of_mut(&mut self, mesh: MeshId) -> Option<&mut Vec<Object>> {
        self.objects.get_mut(&mesh)
    }

    pub fn clear_objects(&mut self) {
        self.objects.clear();
    }

    /// Shader name for a shader-table index
    pub fn shader_name(&self, index: usize) -> Option<&str> {
        self.shaders.get(index).map(String::as_str)
    }

    pub fn shaders(&self) -> &[String] {
        &self.shaders
    }
}
