use glam::{Affine3A, Mat4};

/// Perspective camera. The view transform lives on its node.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            fov,
            aspect,
            near,
            far,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
            self.update_projection_matrix();
        }
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn update_view(&mut self, world: &Affine3A) {
        self.view_matrix = Mat4::from(*world).inverse();
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_perspective(80.0, 16.0 / 9.0, 0.1, 10_000.0)
    }
}
