/// Camera for occlusion passes
/// Double-precision position, yaw/pitch look, left-handed +Z-forward projection
use crate::occlusion::constants::{CHUNK_DIAMETER, PIXEL_HEIGHT, PIXEL_WIDTH};
use glam::{DVec3, IVec3, Mat4, Quat, Vec3};

/// Aspect ratio of the virtual occlusion screen.
pub const OCCLUSION_ASPECT: f32 = PIXEL_WIDTH as f32 / PIXEL_HEIGHT as f32;

pub struct Camera {
    pub position: DVec3,
    pub yaw: f32,   // Rotation around Y axis (radians)
    pub pitch: f32, // Rotation around X axis (radians)
    pub fov: f32,
    pub near: f32,
    pub far: f32,

    pub move_speed: f64,
}

impl Camera {
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov: 70.0f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            move_speed: 10.0,
        }
    }

    /// Rotation-only view matrix. The translation is applied per chunk in
    /// camera-relative coordinates by the occluder.
    pub fn view_rotation(&self) -> Mat4 {
        Mat4::from_quat(self.rotation_quat().inverse())
    }

    /// Get projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov, OCCLUSION_ASPECT, self.near, self.far)
    }

    /// Get forward direction vector
    pub fn forward(&self) -> Vec3 {
        self.rotation_quat() * Vec3::Z
    }

    /// Get right direction vector
    pub fn right(&self) -> Vec3 {
        self.rotation_quat() * Vec3::X
    }

    /// Region (chunk) coordinates containing the camera.
    pub fn region(&self) -> IVec3 {
        (self.position / CHUNK_DIAMETER as f64).floor().as_ivec3()
    }

    /// Get rotation quaternion
    fn rotation_quat(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    /// Turn by the given angles, keeping pitch short of straight up/down
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch += delta_pitch;

        const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
        self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Move camera in local space
    pub fn move_local(&mut self, forward: f32, right: f32, up: f32, dt: f32) {
        let move_vec = self.forward() * forward + self.right() * right + Vec3::Y * up;
        self.position += move_vec.as_dvec3() * self.move_speed * dt as f64;
    }
}
