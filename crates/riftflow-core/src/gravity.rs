use serde::{Deserialize, Serialize};
use crate::types::Vec3;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Gravity {
    /// Constant acceleration (e.g., Earth: [0,-9.81,0])
    Uniform { g: Vec3 },

    /// Point-mass field: a = -mu * (r̂) / r^2  (mu = G*M). Center in world coords.
    InverseSquare { mu: f32, center: Vec3, min_r: f32 },
}

impl Default for Gravity {
    fn default() -> Self { Gravity::Uniform { g: Vec3::new(0.0, -9.81, 0.0) } }
}

impl Gravity {
    #[inline]
    pub fn at(&self, p: Vec3) -> Vec3 {
        match *self {
            Gravity::Uniform { g } => g,
            Gravity::InverseSquare { mu, center, min_r } => {
                let r = p - center;
                let r2 = r.length_squared().max(min_r * min_r);
                if r2 == 0.0 { return Vec3::ZERO; }
                let inv_r3 = 1.0 / (r2 * r2.sqrt());
                -r * (mu * inv_r3)
            }
        }
    }
}
