use serde::{Deserialize, Serialize};
use riftflow_core::types::Vec3;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb { pub min: Vec3, pub max: Vec3 }

impl Aabb {
    #[inline] pub fn new(min: Vec3, max: Vec3) -> Self { Self { min, max } }
    #[inline] pub fn from_center_half_extents(c: Vec3, he: Vec3) -> Self {
        Self { min: c - he, max: c + he }
    }
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut it = points.iter();
        let Some(&first) = it.next() else { return Self::default() };
        it.fold(Self::new(first, first), |b, &p| Self::new(b.min.min(p), b.max.max(p)))
    }
    #[inline] pub fn center(&self) -> Vec3 { (self.min + self.max) * 0.5 }
    #[inline] pub fn half_extents(&self) -> Vec3 { (self.max - self.min) * 0.5 }
    #[inline] pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
    #[inline] pub fn expand_by(&mut self, r: f32) {
        let e = Vec3::splat(r);
        self.min -= e; self.max += e;
    }
    #[inline] pub fn expanded(mut self, r: f32) -> Self { self.expand_by(r); self }
}
