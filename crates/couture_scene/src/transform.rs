use glam::{Affine3A, EulerRot, Mat3, Quat, Vec3};

/// Local TRS with cached local/world matrices.
///
/// The local matrix is rebuilt lazily when position, rotation or scale
/// differ from the values it was last built from.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    local_matrix: Affine3A,
    world_matrix: Affine3A,

    built_from: Option<(Vec3, Quat, Vec3)>,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
            built_from: None,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Rebuilds the local matrix if TRS changed. Returns whether it did.
    pub fn update_local_matrix(&mut self) -> bool {
        let current = (self.position, self.rotation, self.scale);
        if self.built_from == Some(current) {
            return false;
        }
        self.local_matrix =
            Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        self.built_from = Some(current);
        true
    }

    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    pub(crate) fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    /// Rotates so that -Z points at `target` (in parent space).
    ///
    /// Does nothing when `target` is straight along `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        let right = forward.cross(up);
        if right.length_squared() < 1e-8 {
            return;
        }
        let right = right.normalize();
        let true_up = right.cross(forward).normalize();
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, true_up, -forward));
    }

    pub fn mark_dirty(&mut self) {
        self.built_from = None;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_points_negative_z_at_target() {
        let mut t = Transform::from_position(Vec3::new(0.0, 50.0, 130.0));
        t.look_at(Vec3::ZERO, Vec3::Y);
        let forward = t.rotation * Vec3::NEG_Z;
        let expected = (Vec3::ZERO - t.position).normalize();
        assert!(forward.distance(expected) < 1e-5);
    }

    #[test]
    fn local_matrix_rebuilds_only_on_change() {
        let mut t = Transform::new();
        assert!(t.update_local_matrix());
        assert!(!t.update_local_matrix());
        t.position.x = 4.0;
        assert!(t.update_local_matrix());
        assert_eq!(t.local_matrix().translation.x, 4.0);
    }
}
