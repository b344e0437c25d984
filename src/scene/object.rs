use glam::{Affine3A, Mat4, Vec3};

/// One placement of a mesh in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: String,
    pub transform: Affine3A,
    /// Material slot overrides; empty means use the mesh's own slots
    pub used_shaders: Vec<usize>,
}

impl Object {
    pub fn new(name: impl Into<String>, transform: Affine3A) -> Self {
        Self {
            name: name.into(),
            transform,
            used_shaders: Vec::new(),
        }
    }

    /// From a 4x4 matrix whose last row is (0, 0, 0, 1)
    pub fn from_matrix(name: impl Into<String>, matrix: Mat4) -> Self {
        Self::new(name, Affine3A::from_mat4(matrix))
    }

    /// From a row-major 3x4 matrix, the layout the host hands over
    pub fn from_rows_3x4(name: impl Into<String>, rows: [f32; 12]) -> Self {
        Self::new(name, affine_from_rows_3x4(&rows))
    }

    pub fn with_shaders(mut self, used_shaders: Vec<usize>) -> Self {
        self.used_shaders = used_shaders;
        self
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.transform.transform_point3(point)
    }

    /// Linear part only, translation is ignored
    pub fn transform_direction(&self, direction: Vec3) -> Vec3 {
        self.transform.transform_vector3(direction)
    }
}

/// Build an affine transform from a row-major 3x4 matrix
pub fn affine_from_rows_3x4(rows: &[f32; 12]) -> Affine3A {
    let mat = Mat4::from_cols_array(&[
        rows[0], rows[4], rows[8], 0.0,
        rows[1], rows[5], rows[9], 0.0,
        rows[2], rows[6], rows[10], 0.0,
        rows[3], rows[7], rows[11], 1.0,
    ]);
    Affine3A::from_mat4(mat)
}

/// Row-major 3x4 layout of an affine transform, as scatter packets carry it
pub fn affine_to_rows_3x4(transform: &Affine3A) -> [f32; 12] {
    let m = transform.matrix3;
    let t = transform.translation;
    [
        m.x_axis.x, m.y_axis.x, m.z_axis.x, t.x,
        m.x_axis.y, m.y_axis.y, m.z_axis.y, t.y,
        m.x_axis.z, m.y_axis.z, m.z_axis.z, t.z,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_3x4_round_trip() {
        let rows = [
            2.0, 0.0, 0.0, 5.0,
            0.0, 3.0, 0.0, -1.0,
            0.0, 0.0, 4.0, 0.5,
        ];
        let object = Object::from_rows_3x4("Inst", rows);
        assert_eq!(object.transform_point(Vec3::ONE), Vec3::new(7.0, 2.0, 4.5));
        assert_eq!(affine_to_rows_3x4(&object.transform), rows);
    }

    #[test]
    fn test_direction_ignores_translation() {
        let object = Object::new("Inst", Affine3A::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(object.transform_direction(Vec3::Y), Vec3::Y);
        assert_eq!(object.transform_point(Vec3::Y), Vec3::new(10.0, 1.0, 0.0));
    }

    #[test]
    fn test_from_matrix() {
        let object = Object::from_matrix("Inst", Mat4::from_scale(Vec3::splat(2.0)));
        assert_eq!(object.transform_point(Vec3::ONE), Vec3::splat(2.0));
    }
}
