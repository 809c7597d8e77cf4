use glam::{Mat4, Vec3};

use crate::constants::{
    EYE_POSITION, FAR_PLANE, FIELD_OF_VIEW_DEGREES, NEAR_PLANE, OFFSET_STEP, ROTATION_AXIS,
    ROTATION_DEGREES_PER_SECOND, WINDOW_HEIGHT, WINDOW_WIDTH,
};
use crate::input::Offset;

/// Uniform block layout shared with `sphere.vert`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub model: Mat4,
}

impl Transforms {
    pub fn at(elapsed_seconds: f32, offset: Offset) -> Self {
        Self {
            view: view(),
            projection: projection(),
            model: model(elapsed_seconds, offset),
        }
    }

    pub fn uniforms(&self) -> SceneUniforms {
        SceneUniforms {
            model: self.model.to_cols_array_2d(),
            view: self.view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
        }
    }
}

pub fn view() -> Mat4 {
    Mat4::look_at_rh(Vec3::from(EYE_POSITION), Vec3::ZERO, Vec3::Y)
}

/// Right-handed perspective with 0..1 depth and Y pointing down, as Vulkan
/// clip space expects.
pub fn projection() -> Mat4 {
    let aspect = WINDOW_WIDTH as f32 / WINDOW_HEIGHT as f32;
    let mut projection = Mat4::perspective_rh(
        FIELD_OF_VIEW_DEGREES.to_radians(),
        aspect,
        NEAR_PLANE,
        FAR_PLANE,
    );
    projection.y_axis.y *= -1.0;
    projection
}

pub fn rotation_degrees(elapsed_seconds: f32) -> f32 {
    ROTATION_DEGREES_PER_SECOND * elapsed_seconds
}

pub fn model(elapsed_seconds: f32, offset: Offset) -> Mat4 {
    let axis = Vec3::from(ROTATION_AXIS).normalize();
    let angle = rotation_degrees(elapsed_seconds).to_radians();
    Mat4::from_translation(offset.as_vec3() * OFFSET_STEP) * Mat4::from_axis_angle(axis, angle)
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec4};

    use super::*;

    #[test]
    fn rotation_tracks_elapsed_time() {
        let axis = Vec3::new(1.0, 0.3, 0.5).normalize();

        for &t in &[0.0_f32, 0.5, 1.0, 3.2] {
            let model = model(t, Offset::default());
            let (_, rotation, translation) = model.to_scale_rotation_translation();
            let expected = Quat::from_axis_angle(axis, (50.0 * t).to_radians());

            assert!(translation.length() < 1e-6);
            assert!(rotation.abs_diff_eq(expected, 1e-5) || rotation.abs_diff_eq(-expected, 1e-5));
        }
    }

    #[test]
    fn rotation_axis_is_fixed() {
        let axis = Vec3::new(1.0, 0.3, 0.5);
        let model = model(2.7, Offset::default());

        assert!(model.transform_vector3(axis).abs_diff_eq(axis, 1e-5));
    }

    #[test]
    fn offset_translates_model() {
        let offset = Offset { dx: 2, dy: -4, dz: 1 };
        let model = model(0.0, offset);

        let moved = model.transform_point3(Vec3::ZERO);
        assert!(moved.abs_diff_eq(Vec3::new(0.1, -0.2, 0.05), 1e-6));
    }

    #[test]
    fn view_looks_at_origin_from_eye() {
        let view = view();

        let eye = view.transform_point3(Vec3::new(0.0, 0.0, 5.0));
        assert!(eye.abs_diff_eq(Vec3::ZERO, 1e-6));
        let origin = view.transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-6));
    }

    #[test]
    fn projection_maps_near_and_far_planes() {
        let projection = projection();

        let near = projection * Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = projection * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);

        // Points above the eye land in the upper half of Vulkan's Y-down clip space.
        let up = projection * Vec4::new(0.0, 1.0, -5.0, 1.0);
        assert!(up.y < 0.0);

        let fov_scale = 1.0 / (22.5_f32.to_radians()).tan();
        assert!((projection.y_axis.y + fov_scale).abs() < 1e-5);
        assert!((projection.x_axis.x - fov_scale * 600.0 / 800.0).abs() < 1e-5);
    }

    #[test]
    fn view_and_projection_ignore_time() {
        let first = Transforms::at(0.0, Offset::default());
        let later = Transforms::at(12.5, Offset { dx: 3, dy: 1, dz: 0 });

        assert_eq!(first.view, later.view);
        assert_eq!(first.projection, later.projection);
        assert_ne!(first.model, later.model);
    }

    #[test]
    fn uniforms_are_column_major() {
        let transforms = Transforms::at(1.0, Offset::default());
        let uniforms = transforms.uniforms();

        assert_eq!(uniforms.model, transforms.model.to_cols_array_2d());
        assert_eq!(uniforms.view[3], transforms.view.w_axis.to_array());
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 192);
    }
}
