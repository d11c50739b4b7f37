use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use std::f32::consts::{PI, TAU};

use crate::core::ray::Ray;

/// Perspective camera for 3D rendering.
/// Y-up, right-handed, depth mapped to [0, 1] for WebGPU.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_projection: [[f32; 4]; 4],
    /// Eye position, w = 1.
    pub eye: [f32; 4],
}

impl CameraUniform {
    /// Number of f32s in the uniform.
    pub const FLOATS: usize = 20;
}

impl Camera3D {
    pub fn new(fov_y: f32, near: f32, far: f32, viewport: Vec2) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            fov_y,
            near,
            far,
            viewport,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Resize the viewport (e.g. on window resize). Zero sizes are ignored.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.viewport = Vec2::new(width, height);
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect(), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_projection: self.view_projection().to_cols_array_2d(),
            eye: self.position.extend(1.0).to_array(),
        }
    }

    /// Ray from the eye through canvas pixel (x, y), origin top-left.
    pub fn screen_ray(&self, x: f32, y: f32) -> Ray {
        let ndc_x = 2.0 * x / self.viewport.x - 1.0;
        let ndc_y = 1.0 - 2.0 * y / self.viewport.y;
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        Ray::new(self.position, far - near)
    }

    /// Canvas pixel a world point projects to, or `None` behind the eye.
    pub fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }
}

/// Orbit camera rig: pointer drags rotate around the target, the wheel zooms.
/// Motion is damped, so `update` must run every frame for it to settle.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enabled: bool,
    /// Fraction of the pending motion applied per update (0..1].
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    radius: f32,
    /// Azimuth around +Y, measured from +Z.
    theta: f32,
    /// Polar angle from +Y.
    phi: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    drag_from: Option<Vec2>,
}

impl OrbitControls {
    /// Rig matching the camera's current pose around its target.
    pub fn from_camera(camera: &Camera3D) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.length();
        let (theta, phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, 0.0)
        };
        Self {
            enabled: true,
            damping: 0.05,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar: 0.0,
            max_polar: PI,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            radius,
            theta,
            phi,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            drag_from: None,
        }
    }

    pub fn with_distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    pub fn with_max_polar(mut self, max_polar: f32) -> Self {
        self.max_polar = max_polar;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.001, 1.0);
        self
    }

    /// Turn input handling on or off. Disabling drops any rotation in progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.drag_from = None;
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.drag_from.is_some()
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn polar_angle(&self) -> f32 {
        self.phi
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.enabled {
            self.drag_from = Some(Vec2::new(x, y));
        }
    }

    /// Accumulate rotation from a pointer drag. A full viewport height of
    /// travel turns the camera once around.
    pub fn pointer_move(&mut self, x: f32, y: f32, viewport_height: f32) {
        if !self.enabled || viewport_height <= 0.0 {
            return;
        }
        let Some(from) = self.drag_from else {
            return;
        };
        let current = Vec2::new(x, y);
        let delta = current - from;
        self.theta_delta -= TAU * delta.x / viewport_height * self.rotate_speed;
        self.phi_delta -= TAU * delta.y / viewport_height * self.rotate_speed;
        self.drag_from = Some(current);
    }

    pub fn pointer_up(&mut self) {
        self.drag_from = None;
    }

    /// Zoom: positive delta moves away from the target.
    pub fn wheel(&mut self, delta: f32) {
        if !self.enabled || delta == 0.0 {
            return;
        }
        let step = 0.95_f32.powf(self.zoom_speed);
        if delta > 0.0 {
            self.scale /= step;
        } else {
            self.scale *= step;
        }
    }

    /// Apply damped motion and write the new pose into `camera`.
    pub fn update(&mut self, camera: &mut Camera3D) {
        self.theta += self.theta_delta * self.damping;
        self.phi += self.phi_delta * self.damping;
        self.phi = self
            .phi
            .clamp(self.min_polar.max(1e-6), self.max_polar.min(PI - 1e-6));

        self.radius = (self.radius * self.scale).clamp(self.min_distance, self.max_distance);

        let sin_phi = self.phi.sin();
        let offset = Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        );
        camera.position = camera.target + offset;

        self.theta_delta *= 1.0 - self.damping;
        self.phi_delta *= 1.0 - self.damping;
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn camera() -> Camera3D {
        let mut cam = Camera3D::new(45.0, 0.1, 100.0, Vec2::new(800.0, 600.0))
            .with_position(Vec3::new(3.0, 6.0, 10.0));
        cam.look_at(Vec3::new(0.0, 3.0, 0.0));
        cam
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = camera();
        let ray = cam.screen_ray(400.0, 300.0);
        let expected = (cam.target - cam.position).normalize();
        assert!((ray.direction - expected).length() < 1e-4, "dir={:?}", ray.direction);
        assert_eq!(ray.origin, cam.position);
    }

    #[test]
    fn target_projects_to_viewport_center() {
        let cam = camera();
        let p = cam.world_to_screen(cam.target).unwrap();
        assert!((p - Vec2::new(400.0, 300.0)).length() < 1e-2, "p={:?}", p);
    }

    #[test]
    fn projected_point_lies_on_its_screen_ray() {
        let cam = camera();
        let point = Vec3::new(0.35, 2.0, -0.3);
        let px = cam.world_to_screen(point).unwrap();
        let ray = cam.screen_ray(px.x, px.y);
        let t = (point - ray.origin).dot(ray.direction);
        assert!((ray.at(t) - point).length() < 1e-3);
    }

    #[test]
    fn points_behind_eye_do_not_project() {
        let cam = camera();
        let behind = cam.position + (cam.position - cam.target);
        assert!(cam.world_to_screen(behind).is_none());
    }

    #[test]
    fn upper_screen_half_maps_above_center() {
        let cam = camera();
        let up = cam.screen_ray(400.0, 100.0);
        let center = cam.screen_ray(400.0, 300.0);
        assert!(up.direction.y > center.direction.y);
    }

    #[test]
    fn set_viewport_ignores_zero() {
        let mut cam = camera();
        cam.set_viewport(0.0, 100.0);
        assert_eq!(cam.viewport, Vec2::new(800.0, 600.0));
        cam.set_viewport(1024.0, 512.0);
        assert!((cam.aspect() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn idle_orbit_keeps_pose() {
        let mut cam = camera();
        let start = cam.position;
        let mut orbit = OrbitControls::from_camera(&cam);
        orbit.update(&mut cam);
        assert!((cam.position - start).length() < 1e-4);
    }

    #[test]
    fn drag_rotates_at_constant_distance() {
        let mut cam = camera();
        let mut orbit = OrbitControls::from_camera(&cam);
        let distance = orbit.distance();
        orbit.pointer_down(400.0, 300.0);
        orbit.pointer_move(460.0, 300.0, 600.0);
        orbit.pointer_up();
        let start = cam.position;
        for _ in 0..30 {
            orbit.update(&mut cam);
        }
        assert!((cam.position - start).length() > 0.1);
        assert!(((cam.position - cam.target).length() - distance).abs() < 1e-3);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut cam = camera();
        let max_polar = FRAC_PI_2 - 0.1;
        let mut orbit = OrbitControls::from_camera(&cam).with_max_polar(max_polar);
        // Dragging upward tips the camera down toward the ground
        orbit.pointer_down(400.0, 600.0);
        orbit.pointer_move(400.0, -6000.0, 600.0);
        for _ in 0..200 {
            orbit.update(&mut cam);
        }
        assert!(orbit.polar_angle() <= max_polar + 1e-5);
        assert!(cam.position.y > cam.target.y);
    }

    #[test]
    fn wheel_zoom_respects_limits() {
        let mut cam = camera();
        let mut orbit = OrbitControls::from_camera(&cam).with_distance_limits(5.0, 20.0);
        for _ in 0..100 {
            orbit.wheel(1.0);
            orbit.update(&mut cam);
        }
        assert!((orbit.distance() - 20.0).abs() < 1e-4);
        for _ in 0..100 {
            orbit.wheel(-1.0);
            orbit.update(&mut cam);
        }
        assert!((orbit.distance() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn disabled_orbit_ignores_input() {
        let mut cam = camera();
        let start = cam.position;
        let mut orbit = OrbitControls::from_camera(&cam);
        orbit.set_enabled(false);
        orbit.pointer_down(0.0, 0.0);
        orbit.pointer_move(300.0, 300.0, 600.0);
        orbit.wheel(1.0);
        orbit.update(&mut cam);
        assert!(!orbit.is_rotating());
        assert!((cam.position - start).length() < 1e-4);
    }
}
