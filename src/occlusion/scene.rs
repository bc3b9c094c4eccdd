use glam::{DVec3, IVec3, Mat4, Vec3};

/// Per-frame camera state and the per-chunk model-view-projection matrix.
///
/// The MVP is rebuilt for every chunk with the chunk origin expressed
/// relative to the camera, so the float transform only ever sees small
/// coordinates no matter how far the camera is from the world origin.
#[derive(Debug, Clone)]
pub struct SceneContext {
    camera: DVec3,
    projection: Mat4,
    view: Mat4,
    view_projection: Mat4,
    origin: IVec3,
    offset: Vec3,
    mvp: Mat4,
}

impl Default for SceneContext {
    fn default() -> Self {
        Self {
            camera: DVec3::ZERO,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            origin: IVec3::ZERO,
            offset: Vec3::ZERO,
            mvp: Mat4::IDENTITY,
        }
    }
}

impl SceneContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// `view` must not contain the camera translation; it is applied per
    /// chunk from `camera`.
    pub fn prepare_scene(&mut self, projection: Mat4, view: Mat4, camera: DVec3) {
        self.projection = projection;
        self.view = view;
        self.view_projection = projection * view;
        self.camera = camera;
    }

    pub fn prepare_chunk(&mut self, origin: IVec3) {
        self.origin = origin;
        self.offset = (origin.as_dvec3() - self.camera).as_vec3();
        self.mvp = self.view_projection * Mat4::from_translation(self.offset);
    }

    #[inline]
    pub fn camera(&self) -> DVec3 {
        self.camera
    }

    #[inline]
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    #[inline]
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    #[inline]
    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    /// Chunk origin minus camera position.
    #[inline]
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    #[inline]
    pub fn mvp(&self) -> &Mat4 {
        &self.mvp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn offset_is_camera_relative() {
        let mut scene = SceneContext::new();
        scene.prepare_scene(Mat4::IDENTITY, Mat4::IDENTITY, DVec3::new(10.5, 64.0, -3.25));
        scene.prepare_chunk(IVec3::new(16, 48, -16));
        assert_eq!(scene.offset(), Vec3::new(5.5, -16.0, -12.75));
        assert_eq!(scene.origin(), IVec3::new(16, 48, -16));
    }

    #[test]
    fn far_from_origin_keeps_precision() {
        let mut scene = SceneContext::new();
        let camera = DVec3::new(30_000_000.25, 70.0, -29_999_999.5);
        scene.prepare_scene(Mat4::IDENTITY, Mat4::IDENTITY, camera);
        scene.prepare_chunk(IVec3::new(30_000_000, 64, -30_000_000));
        assert_eq!(scene.offset(), Vec3::new(-0.25, -6.0, -0.5));
    }

    #[test]
    fn mvp_applies_translation_last() {
        let mut scene = SceneContext::new();
        let projection = Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0));
        scene.prepare_scene(projection, Mat4::IDENTITY, DVec3::ZERO);
        scene.prepare_chunk(IVec3::new(1, 0, 0));

        let p = *scene.mvp() * Vec4::new(0.0, 1.0, 0.0, 1.0);
        assert_eq!(p, Vec4::new(2.0, 2.0, 0.0, 1.0));
    }
}
