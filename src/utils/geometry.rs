// src/utils/geometry.rs

use egui::{Pos2, Rect};
use glam::{Mat4, Vec3};

/// Tolerance used for parallel-ray and degenerate-segment checks.
pub const EPSILON: f32 = 1e-6;

/// Euclidean distance between two points.
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Signed angle of the segment `a -> b` projected onto the XY plane.
///
/// The result lies in `(-π, π]`; `atan2` can yield `-π` for a negative zero
/// `dy`, which is folded onto `π`.
pub fn angle_of(a: Vec3, b: Vec3) -> f32 {
    let angle = (b.y - a.y).atan2(b.x - a.x);
    if angle <= -std::f32::consts::PI {
        std::f32::consts::PI
    } else {
        angle
    }
}

pub fn midpoint(a: Vec3, b: Vec3) -> Vec3 {
    (a + b) * 0.5
}

/// A half-line starting at `origin`. `direction` is kept normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Squared distance between the ray and the segment `[a, b]`, together
    /// with the ray parameter of the closest point on the ray.
    pub fn distance_sq_to_segment(&self, a: Vec3, b: Vec3) -> (f32, f32) {
        let seg = b - a;
        let seg_len_sq = seg.length_squared();
        if seg_len_sq <= EPSILON {
            let t = (a - self.origin).dot(self.direction).max(0.0);
            return (self.at(t).distance_squared(a), t);
        }

        // Closest point on the infinite lines, then clamp onto the segment
        // and back onto the ray.
        let w0 = self.origin - a;
        let b_dot = self.direction.dot(seg);
        let d_dot = self.direction.dot(w0);
        let e_dot = seg.dot(w0);
        let denom = seg_len_sq - b_dot * b_dot;

        let mut s = if denom.abs() > EPSILON {
            ((e_dot - b_dot * d_dot) / denom).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut t = (a + seg * s - self.origin).dot(self.direction).max(0.0);
        s = ((self.at(t) - a).dot(seg) / seg_len_sq).clamp(0.0, 1.0);
        t = (a + seg * s - self.origin).dot(self.direction).max(0.0);

        (self.at(t).distance_squared(a + seg * s), t)
    }
}

/// A plane in constant-normal form: `normal · p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub fn new(normal: Vec3, constant: f32) -> Self {
        Self {
            normal: normal.normalize_or_zero(),
            constant,
        }
    }

    /// Plane with the given normal passing through `normal * offset`.
    pub fn from_normal_and_offset(normal: Vec3, offset: f32) -> Self {
        Self::new(normal, -offset)
    }

    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }
}

/// Projects a world-space point into pixel coordinates inside `viewport`.
///
/// Screen y grows downward while normalized device y grows upward, hence the
/// flip. Returns `None` when the point cannot be projected (on the camera
/// plane, or non-finite).
pub fn world_to_screen(point: Vec3, view_proj: Mat4, viewport: Rect) -> Option<Pos2> {
    let clip = view_proj * point.extend(1.0);
    if clip.w.abs() <= EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if !ndc.x.is_finite() || !ndc.y.is_finite() {
        return None;
    }
    let x = viewport.min.x + (ndc.x * 0.5 + 0.5) * viewport.width();
    let y = viewport.min.y + (0.5 - ndc.y * 0.5) * viewport.height();
    Some(Pos2::new(x, y))
}

/// Builds the pick ray through `pixel`, starting on the camera's near plane.
pub fn screen_to_world_ray(pixel: Pos2, view_proj: Mat4, viewport: Rect) -> Option<Ray> {
    if viewport.width() <= 0.0 || viewport.height() <= 0.0 {
        return None;
    }
    let inverse = view_proj.inverse();
    let ndc_x = ((pixel.x - viewport.min.x) / viewport.width()) * 2.0 - 1.0;
    let ndc_y = 1.0 - ((pixel.y - viewport.min.y) / viewport.height()) * 2.0;
    let near = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
    let far = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
    let direction = (far - near).normalize_or_zero();
    if direction == Vec3::ZERO || !near.is_finite() {
        return None;
    }
    Some(Ray::new(near, direction))
}

/// Intersects a ray with a plane.
///
/// `None` when the ray runs parallel to the plane (unless it lies in it) or
/// when the plane is behind the ray origin.
pub fn ray_plane_intersection(ray: &Ray, plane: &Plane) -> Option<Vec3> {
    let denominator = plane.normal.dot(ray.direction);
    if denominator.abs() <= EPSILON {
        if plane.distance_to_point(ray.origin).abs() <= EPSILON {
            return Some(ray.origin);
        }
        return None;
    }
    let t = -(ray.origin.dot(plane.normal) + plane.constant) / denominator;
    if t < 0.0 {
        return None;
    }
    Some(ray.at(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::new(20.0, 10.0), egui::vec2(800.0, 600.0))
    }

    fn plan_view_proj() -> Mat4 {
        let aspect = 800.0 / 600.0;
        let projection = Mat4::orthographic_rh(-50.0 * aspect, 50.0 * aspect, -50.0, 50.0, 1.0, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        projection * view
    }

    fn perspective_view_proj() -> Mat4 {
        let projection = Mat4::perspective_rh(35f32.to_radians(), 800.0 / 600.0, 0.1, 500.0);
        let view = Mat4::look_at_rh(Vec3::splat(50.0), Vec3::ZERO, Vec3::Y);
        projection * view
    }

    #[test]
    fn test_distance_and_midpoint() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert_approx_eq!(distance(a, b), 5.0);
        assert_eq!(midpoint(a, b), Vec3::new(1.5, 2.0, 0.0));
    }

    #[test]
    fn test_angle_of_quadrants() {
        let o = Vec3::ZERO;
        assert_approx_eq!(angle_of(o, Vec3::new(10.0, 0.0, 0.0)), 0.0);
        assert_approx_eq!(angle_of(o, Vec3::new(0.0, 10.0, 0.0)), FRAC_PI_2);
        assert_approx_eq!(angle_of(o, Vec3::new(0.0, -10.0, 0.0)), -FRAC_PI_2);
        assert_approx_eq!(angle_of(o, Vec3::new(-10.0, 0.0, 0.0)), PI);
    }

    #[test]
    fn test_angle_of_negative_zero_folds_to_pi() {
        let angle = angle_of(Vec3::new(0.0, 0.0, 0.0), Vec3::new(-1.0, -0.0, 0.0));
        assert_approx_eq!(angle, PI);
    }

    #[test]
    fn test_ray_plane_parallel_is_none() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::X);
        let plane = Plane::from_normal_and_offset(Vec3::Z, 0.0);
        assert!(ray_plane_intersection(&ray, &plane).is_none());
    }

    #[test]
    fn test_ray_plane_hit_with_offset() {
        let ray = Ray::new(Vec3::new(2.0, 3.0, 5.0), -Vec3::Z);
        let plane = Plane::from_normal_and_offset(Vec3::Z, 1.5);
        let hit = ray_plane_intersection(&ray, &plane).unwrap();
        assert_approx_eq!(hit.z, 1.5);
        assert_approx_eq!(hit.x, 2.0);
        assert_approx_eq!(hit.y, 3.0);
    }

    #[test]
    fn test_plan_center_projects_to_viewport_center() {
        let pixel = world_to_screen(Vec3::ZERO, plan_view_proj(), viewport()).unwrap();
        assert_approx_eq!(pixel.x, 420.0, 1e-3);
        assert_approx_eq!(pixel.y, 310.0, 1e-3);
    }

    #[test]
    fn test_screen_y_is_flipped() {
        let up = world_to_screen(Vec3::new(0.0, 10.0, 0.0), plan_view_proj(), viewport()).unwrap();
        let center = world_to_screen(Vec3::ZERO, plan_view_proj(), viewport()).unwrap();
        assert!(up.y < center.y);
    }

    #[test]
    fn test_plan_round_trip_through_draw_plane() {
        let plane = Plane::from_normal_and_offset(Vec3::Z, 0.0);
        for pixel in [Pos2::new(20.0, 10.0), Pos2::new(333.0, 222.0), Pos2::new(819.0, 609.0)] {
            let ray = screen_to_world_ray(pixel, plan_view_proj(), viewport()).unwrap();
            let point = ray_plane_intersection(&ray, &plane).unwrap();
            assert_approx_eq!(point.z, 0.0, 1e-4);
            let back = world_to_screen(point, plan_view_proj(), viewport()).unwrap();
            assert_approx_eq!(back.x, pixel.x, 1e-2);
            assert_approx_eq!(back.y, pixel.y, 1e-2);
        }
    }

    #[test]
    fn test_perspective_round_trip_through_ground_plane() {
        let plane = Plane::from_normal_and_offset(Vec3::Y, 0.0);
        let pixel = Pos2::new(400.0, 450.0);
        let ray = screen_to_world_ray(pixel, perspective_view_proj(), viewport()).unwrap();
        let point = ray_plane_intersection(&ray, &plane).unwrap();
        let back = world_to_screen(point, perspective_view_proj(), viewport()).unwrap();
        assert_approx_eq!(back.x, pixel.x, 1e-1);
        assert_approx_eq!(back.y, pixel.y, 1e-1);
    }

    #[test]
    fn test_ray_segment_distance() {
        let ray = Ray::new(Vec3::new(5.0, 0.5, 10.0), -Vec3::Z);
        let (dist_sq, t) = ray.distance_sq_to_segment(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        assert_approx_eq!(dist_sq, 0.25, 1e-4);
        assert_approx_eq!(t, 10.0, 1e-4);
    }

    #[test]
    fn test_ray_segment_distance_past_endpoint() {
        let ray = Ray::new(Vec3::new(13.0, 4.0, 10.0), -Vec3::Z);
        let (dist_sq, _) = ray.distance_sq_to_segment(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        assert_approx_eq!(dist_sq, 25.0, 1e-3);
    }
}
