use std::f32::consts::{FRAC_PI_2, PI};

use couture_core::{Input, MouseButton};
use glam::{Vec2, Vec3};

use crate::transform::Transform;

const EPS: f32 = 1e-4;

/// Damped orbit camera around a fixed target.
///
/// Left drag rotates, scroll zooms. Panning is disabled; the model is moved
/// with the keyboard instead.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    pub target: Vec3,
    pub radius: f32,
    /// Azimuth around +Y, 0 looking down -Z.
    pub theta: f32,
    /// Polar angle from +Y.
    pub phi: f32,

    rotate_delta: Vec2,
}

impl OrbitControls {
    /// Controls that reproduce a camera currently at `position` looking at
    /// `target`.
    #[must_use]
    pub fn from_position(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let radius = offset.length().max(EPS);
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            damping_factor: 0.1,
            enable_damping: true,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,

            target,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),

            rotate_delta: Vec2::ZERO,
        }
    }

    /// Limits the polar angle to `band` radians either side of the horizon.
    pub fn set_polar_band(&mut self, band: f32) {
        self.min_polar_angle = (FRAC_PI_2 - band).max(0.0);
        self.max_polar_angle = (FRAC_PI_2 + band).min(PI);
    }

    pub fn set_distance_limits(&mut self, min: f32, max: f32) {
        self.min_distance = min;
        self.max_distance = max;
        self.radius = self.radius.clamp(min, max);
    }

    /// Camera position for the current spherical coordinates.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.target + self.radius * Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
    }

    /// Applies this frame's input and writes the camera transform.
    pub fn update(&mut self, transform: &mut Transform, input: &Input, dt: f32) {
        let screen_height = input.screen_size().y.max(1.0);

        if input.is_button_pressed(MouseButton::Left) {
            let per_pixel = 2.0 * PI / screen_height * self.rotate_speed;
            self.rotate_delta -= input.mouse_delta() * per_pixel;
        }

        if self.enable_damping {
            // Frame-rate independent: same decay per second at any dt.
            let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
            let applied = self.rotate_delta * (1.0 - retention);
            self.theta += applied.x;
            self.phi += applied.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        self.phi = self
            .phi
            .clamp(self.min_polar_angle.max(EPS), self.max_polar_angle.min(PI - EPS));

        let scroll = input.scroll_delta().y;
        if scroll != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(scroll.abs());
            if scroll > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
        }
        self.radius = self.radius.clamp(self.min_distance, self.max_distance);

        transform.position = self.position();
        transform.look_at(self.target, Vec3::Y);
    }
}
