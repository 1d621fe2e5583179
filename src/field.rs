//! Dot field generation
//!
//! Walks latitude bands from the south pole to the north pole and drops dots
//! along each band, more of them where the band's circumference is larger.
//! This is plain angular sampling scaled by circumference, not an equal-area
//! distribution.

use crate::geo::{geo_to_unit_vector, GeoPoint};
use crate::mask::VisibilityMask;
use glam::{Mat4, Vec3};
use std::ops::Range;
use tracing::debug;

/// How far past the surface a dot looks when orienting itself
const LOOK_OUT_DISTANCE: f64 = 5.0;

/// Upper bound on dots per unit of band circumference
pub const MAX_DOT_DENSITY: f64 = 200.0;

/// Upper bound on latitude bands
pub const MAX_ROWS: u32 = 2000;

#[derive(Clone, Copy, Debug)]
pub struct FieldParams {
    pub rows: u32,
    pub density: f64,
    pub radius: f64,
}

/// One latitude band of the field
#[derive(Clone, Debug)]
pub struct DotBand {
    pub lat: f64,
    /// Real-valued sample count; dot `x` sits at `-180 + x * 360 / dots_per_band`
    pub dots_per_band: f64,
    /// Indices into the field's dot list
    pub range: Range<usize>,
}

/// Immutable output of [`generate_dot_field`], drawn as one batch
pub struct DotField {
    transforms: Vec<Mat4>,
    points: Vec<GeoPoint>,
    bands: Vec<DotBand>,
    radius: f64,
}

impl DotField {
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn bands(&self) -> &[DotBand] {
        &self.bands
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Dot centres and outward normals in globe-local space
    pub fn positions_and_normals(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.transforms
            .iter()
            .map(|m| (m.w_axis.truncate(), m.z_axis.truncate()))
    }
}

/// Plot every visible dot of the globe
pub fn generate_dot_field(mask: &VisibilityMask, params: &FieldParams) -> DotField {
    let rows = params.rows.clamp(1, MAX_ROWS);
    let step = 180.0 / rows as f64;
    let density = params.density.clamp(0.0, MAX_DOT_DENSITY);

    let mut transforms = Vec::new();
    let mut points = Vec::new();
    let mut bands = Vec::with_capacity(rows as usize + 1);

    for row in 0..=rows {
        let lat = -90.0 + row as f64 * step;
        let band_radius = lat.abs().to_radians().cos() * params.radius;
        let circumference = band_radius * std::f64::consts::TAU;
        let dots_per_band = circumference * density;

        let start = transforms.len();
        let mut x = 0usize;
        while (x as f64) < dots_per_band {
            let long = -180.0 + x as f64 * 360.0 / dots_per_band;
            x += 1;

            if !mask.is_visible(lat, long) {
                continue;
            }

            transforms.push(dot_transform(lat, long, params.radius));
            points.push(GeoPoint::new(lat, long));
        }

        bands.push(DotBand {
            lat,
            dots_per_band,
            range: start..transforms.len(),
        });
    }

    debug!(
        dots = transforms.len(),
        bands = bands.len(),
        rows,
        density,
        "dot field generated"
    );

    DotField {
        transforms,
        points,
        bands,
        radius: params.radius,
    }
}

/// Rigid transform placing a dot on the sphere with its +Z axis facing outward
fn dot_transform(lat: f64, long: f64, radius: f64) -> Mat4 {
    let position = geo_to_unit_vector(lat, long, radius);
    let target = geo_to_unit_vector(lat, long, radius + LOOK_OUT_DISTANCE);
    let (x_axis, y_axis, z_axis) = look_basis(target - position, Vec3::Y);

    Mat4::from_cols(
        x_axis.extend(0.0),
        y_axis.extend(0.0),
        z_axis.extend(0.0),
        position.extend(1.0),
    )
}

/// Orthonormal basis whose +Z is `forward`, nudged off `up` when they are parallel
fn look_basis(forward: Vec3, up: Vec3) -> (Vec3, Vec3, Vec3) {
    let mut z = if forward.length_squared() == 0.0 {
        Vec3::Z
    } else {
        forward.normalize()
    };

    let mut x = up.cross(z);
    if x.length_squared() == 0.0 {
        if up.z.abs() == 1.0 {
            z.x += 0.0001;
        } else {
            z.z += 0.0001;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);
    (x, y, z)
}
