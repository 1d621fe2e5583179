//! Perspective camera and picking rays

use glam::{Mat4, Vec2, Vec3};

/// Default vertical field of view in degrees
pub const DEFAULT_FOV_DEGREES: f32 = 20.0;

pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    /// Camera on the +Z axis at `distance`, looking at the origin
    pub fn looking_at_origin(distance: f32, aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, distance),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: DEFAULT_FOV_DEGREES.to_radians(),
            aspect,
            near: 1.0,
            far: 100.0,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect.max(1e-3), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World point to normalized device coordinates
    pub fn project(&self, world: Vec3) -> Vec3 {
        self.view_projection().project_point3(world)
    }

    /// Ray from the camera through `ndc` (x, y in [-1, 1])
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let through = inverse.project_point3(ndc.extend(0.5));
        Ray {
            origin: self.position,
            direction: (through - self.position).normalize_or_zero(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Same ray expressed in another space (rigid `transform` only)
    pub fn transformed(&self, transform: &Mat4) -> Ray {
        Ray {
            origin: transform.transform_point3(self.origin),
            direction: transform.transform_vector3(self.direction).normalize_or_zero(),
        }
    }

    /// Distance to the first hit on a sphere, if any
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = -b - root;
        if near > 0.0 {
            return Some(near);
        }
        let far = -b + root;
        (far > 0.0).then_some(far)
    }
}
