use serde::{Deserialize, Serialize};
use riftflow_core::types::Vec3;
use crate::aabb::Aabb;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct RawMesh { vertices: Vec<Vec3>, triangles: Vec<[u32; 3]> }

/// Closed triangle mesh used as a domain boundary. Containment is by ray parity,
/// so the mesh must be watertight; winding does not matter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMesh", into = "RawMesh")]
pub struct TriMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    bounds: Aabb,
}

impl From<RawMesh> for TriMesh {
    fn from(r: RawMesh) -> Self { TriMesh::new(r.vertices, r.triangles) }
}

impl From<TriMesh> for RawMesh {
    fn from(m: TriMesh) -> Self { RawMesh { vertices: m.vertices, triangles: m.triangles } }
}

// Skewed so the parity ray rarely grazes an edge or vertex of axis-aligned meshes.
const RAY_DIR: Vec3 = Vec3::new(0.937_923, 0.298_570, 0.176_620);

impl TriMesh {
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        let bounds = Aabb::from_points(&vertices);
        Self { vertices, triangles, bounds }
    }

    /// Axis-aligned cuboid with half extents `he`, 12 triangles.
    pub fn cuboid(he: Vec3) -> Self {
        let v = |x: f32, y: f32, z: f32| Vec3::new(x * he.x, y * he.y, z * he.z);
        let vertices = vec![
            v(-1.0, -1.0, -1.0), v(1.0, -1.0, -1.0), v(1.0, 1.0, -1.0), v(-1.0, 1.0, -1.0),
            v(-1.0, -1.0, 1.0), v(1.0, -1.0, 1.0), v(1.0, 1.0, 1.0), v(-1.0, 1.0, 1.0),
        ];
        let triangles = vec![
            [0, 2, 1], [0, 3, 2], [4, 5, 6], [4, 6, 7],
            [0, 1, 5], [0, 5, 4], [3, 6, 2], [3, 7, 6],
            [0, 4, 7], [0, 7, 3], [1, 2, 6], [1, 6, 5],
        ];
        Self::new(vertices, triangles)
    }

    #[inline] pub fn bounds(&self) -> Aabb { self.bounds }
    pub fn triangle_count(&self) -> usize { self.triangles.len() }

    pub fn contains(&self, p: Vec3) -> bool {
        if !self.bounds.contains_point(p) { return false; }
        let mut crossings = 0u32;
        for tri in &self.triangles {
            let (Some(&a), Some(&b), Some(&c)) = (
                self.vertices.get(tri[0] as usize),
                self.vertices.get(tri[1] as usize),
                self.vertices.get(tri[2] as usize),
            ) else { continue };
            if ray_hits_triangle(p, RAY_DIR, a, b, c) { crossings += 1; }
        }
        crossings % 2 == 1
    }
}

// Möller–Trumbore, forward hits only.
fn ray_hits_triangle(o: Vec3, d: Vec3, a: Vec3, b: Vec3, c: Vec3) -> bool {
    let e1 = b - a;
    let e2 = c - a;
    let pv = d.cross(e2);
    let det = e1.dot(pv);
    if det.abs() < 1e-12 { return false; }
    let inv = 1.0 / det;
    let tv = o - a;
    let u = tv.dot(pv) * inv;
    if !(0.0..=1.0).contains(&u) { return false; }
    let qv = tv.cross(e1);
    let v = d.dot(qv) * inv;
    if v < 0.0 || u + v > 1.0 { return false; }
    e2.dot(qv) * inv > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use riftflow_core::vec3;

    #[test] fn cuboid_parity() {
        let m = TriMesh::cuboid(vec3(1.0, 2.0, 0.5));
        assert!(m.contains(vec3(0.0, 0.0, 0.0)));
        assert!(m.contains(vec3(0.9, 1.9, 0.4)));
        assert!(!m.contains(vec3(1.1, 0.0, 0.0)));
        assert!(!m.contains(vec3(0.0, 0.0, 0.6)));
    }

    #[test] fn bad_indices_are_skipped() {
        let m = TriMesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 9]]);
        assert!(!m.contains(vec3(0.1, 0.1, 0.0)));
    }
}
