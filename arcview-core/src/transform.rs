/// Camera orientation state and transformation matrices
use nalgebra::{Matrix4, Point3, Unit, UnitQuaternion, Vector2, Vector3, Vector4};

/// Accumulated camera state: rotation, uniform zoom and pan offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraOrientation {
    pub rotation: UnitQuaternion<f32>,
    pub zoom: f32,
    pub pan: Vector2<f32>,
}

impl CameraOrientation {
    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            zoom: 1.0,
            pan: Vector2::zeros(),
        }
    }

    /// Compose a rotation of `angle` radians about `axis` after the current one
    pub fn rotate(&mut self, axis: &Unit<Vector3<f32>>, angle: f32) {
        self.rotation = UnitQuaternion::from_axis_angle(axis, angle) * self.rotation;
        // keep drift from accumulating over long drags
        self.rotation.renormalize();
    }

    pub fn scale(&mut self, factor: f32) {
        self.zoom *= factor;
    }

    pub fn translate(&mut self, offset: Vector2<f32>) {
        self.pan += offset;
    }

    /// Pan and zoom without the rotation
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Transform::translation_matrix(self.pan.x, self.pan.y, 0.0)
            * Transform::scale_matrix(self.zoom, self.zoom, self.zoom)
    }

    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        self.rotation.to_homogeneous()
    }

    /// `T(pan) * S(zoom) * R`
    pub fn matrix(&self) -> Matrix4<f32> {
        self.view_matrix() * self.rotation_matrix()
    }
}

impl Default for CameraOrientation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Planar projection onto `plane` (ax + by + cz + d = 0) from a point light.
    /// Points end up on the plane after the homogeneous divide.
    pub fn shadow_matrix(light: &Point3<f32>, plane: &Vector4<f32>) -> Matrix4<f32> {
        let light = light.to_homogeneous();
        let dot = plane.dot(&light);
        Matrix4::identity() * dot - light * plane.transpose()
    }

    /// Shadow onto the horizontal plane `y = height`
    pub fn ground_shadow_matrix(light: &Point3<f32>, height: f32) -> Matrix4<f32> {
        Self::shadow_matrix(light, &Vector4::new(0.0, 1.0, 0.0, -height))
    }
}
