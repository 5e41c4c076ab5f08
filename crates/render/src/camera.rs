use glam::{Mat4, Vec3};
use vantage_common::{SimulatorConfig, Viewpoint};

/// Inverse camera transform for a viewpoint.
///
/// Translate by `-position`, then rotate by `-roll` (Z), `-pitch` (X) and
/// `-yaw` (Y), composed as `Rz * Rx * Ry * T`.
pub fn view_matrix(viewpoint: &Viewpoint) -> Mat4 {
    let o = viewpoint.orientation;
    Mat4::from_rotation_z((-o.roll).to_radians())
        * Mat4::from_rotation_x((-o.pitch).to_radians())
        * Mat4::from_rotation_y((-o.yaw).to_radians())
        * Mat4::from_translation(-viewpoint.position)
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Lens {
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self {
            fov_degrees: config.fov_degrees,
            aspect: config.aspect_ratio(),
            near: config.near,
            far: config.far,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Right-handed projection with a 0..1 depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self, viewpoint: &Viewpoint) -> Mat4 {
        self.projection_matrix() * view_matrix(viewpoint)
    }

    /// Whether a world-space point lands inside the clip volume.
    pub fn is_visible(&self, viewpoint: &Viewpoint, point: Vec3) -> bool {
        let clip = self.view_projection(viewpoint) * point.extend(1.0);
        if clip.w <= 0.0 {
            return false;
        }
        let ndc = clip.truncate() / clip.w;
        ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && (0.0..=1.0).contains(&ndc.z)
    }
}

impl Default for Lens {
    fn default() -> Self {
        Self::from_config(&SimulatorConfig::default())
    }
}
