use core::f32::consts::PI;
use riftflow_core::types::{Mat3, Vec3};

/// Volume of an ellipsoid with full axis lengths `dims`.
#[inline]
pub fn ellipsoid_volume(dims: Vec3) -> f32 {
    PI / 6.0 * dims.x.abs() * dims.y.abs() * dims.z.abs()
}

/// Spherical cap of the unit sphere.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SphereCap {
    pub volume: f32,
    /// Distance from the sphere centre to the cap centroid, along the cap axis.
    pub centroid: f32,
}

/// Cap of height `h` (clamped to [0, 2]) cut from the unit sphere.
pub fn unit_cap(h: f32) -> SphereCap {
    let h = h.clamp(0.0, 2.0);
    if h <= 0.0 { return SphereCap { volume: 0.0, centroid: 1.0 }; }
    let volume = PI * h * h * (3.0 - h) / 3.0;
    let centroid = 3.0 * (2.0 - h) * (2.0 - h) / (4.0 * (3.0 - h));
    SphereCap { volume, centroid }
}

#[derive(Copy, Clone, Debug)]
pub struct MassProps {
    pub mass: f32,
    pub inv_mass: f32,
    pub inertia: Mat3,
}

impl MassProps {
    pub fn infinite() -> Self {
        Self { mass: f32::INFINITY, inv_mass: 0.0, inertia: Mat3::IDENTITY }
    }

    pub fn from_sphere(radius: f32, density: f32) -> Self {
        let vol = (4.0/3.0) * PI * radius*radius*radius;
        let m = density * vol;
        let ii = 0.4 * m * radius * radius;
        Self { mass: m, inv_mass: 1.0/m, inertia: Mat3::from_diagonal(Vec3::splat(ii).into()) }
    }

    /// Solid box with full dimensions `dims`.
    pub fn from_box(dims: Vec3, density: f32) -> Self {
        let m = density * dims.x * dims.y * dims.z;
        Self::box_with_mass(dims, m)
    }

    pub fn box_with_mass(dims: Vec3, m: f32) -> Self {
        let x2 = dims.x * dims.x;
        let y2 = dims.y * dims.y;
        let z2 = dims.z * dims.z;
        let ix = (1.0/12.0) * m * (y2 + z2);
        let iy = (1.0/12.0) * m * (x2 + z2);
        let iz = (1.0/12.0) * m * (x2 + y2);
        Self { mass: m, inv_mass: 1.0/m, inertia: Mat3::from_diagonal(Vec3::new(ix, iy, iz).into()) }
    }

    /// Solid ellipsoid with full axis lengths `dims`.
    pub fn from_ellipsoid(dims: Vec3, density: f32) -> Self {
        let m = density * ellipsoid_volume(dims);
        let a = dims * 0.5;
        let ix = 0.2 * m * (a.y * a.y + a.z * a.z);
        let iy = 0.2 * m * (a.x * a.x + a.z * a.z);
        let iz = 0.2 * m * (a.x * a.x + a.y * a.y);
        Self { mass: m, inv_mass: 1.0/m, inertia: Mat3::from_diagonal(Vec3::new(ix, iy, iz).into()) }
    }
}
