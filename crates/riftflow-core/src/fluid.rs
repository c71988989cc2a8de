use serde::{Deserialize, Serialize};
use crate::error::{FlowError, FlowResult};

/// Local fluid properties of a domain or of the global field.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FluidProps {
    /// kg/m^3
    pub density: f32,
    /// Pa
    pub pressure: f32,
    /// Dynamic viscosity, Pa*s
    pub viscosity: f32,
}

impl Default for FluidProps { fn default() -> Self { Self::AIR } }

impl FluidProps {
    pub const AIR: FluidProps = FluidProps { density: 1.225, pressure: 101_325.0, viscosity: 1.81e-5 };
    pub const WATER: FluidProps = FluidProps { density: 997.0, pressure: 101_325.0, viscosity: 8.9e-4 };

    /// Standard-atmosphere air at `altitude_m`.
    pub fn isa(altitude_m: f32) -> Self {
        let isa = Isa::default();
        FluidProps { density: isa.density(altitude_m), pressure: isa.pressure(altitude_m), viscosity: Self::AIR.viscosity }
    }

    pub fn validate(&self) -> FlowResult<()> {
        if !(self.density > 0.0) { return Err(FlowError::invalid("fluid density", self.density, "> 0")); }
        if !(self.viscosity > 0.0) { return Err(FlowError::invalid("fluid viscosity", self.viscosity, "> 0")); }
        Ok(())
    }
}

/// International Standard Atmosphere, troposphere only.
#[allow(non_snake_case)]
pub struct Isa {
    pub rho0: f32, // 1.225 kg/m^3
    pub p0: f32,   // 101325 Pa
    pub T0: f32,   // 288.15 K
    pub L: f32,    // 0.0065 K/m
    pub R: f32,    // 287.05 J/(kg*K)
    pub g: f32,    // 9.80665 m/s^2
}

impl Default for Isa {
    fn default() -> Self {
        Self { rho0: 1.225, p0: 101_325.0, T0: 288.15, L: 0.0065, R: 287.05, g: 9.80665 }
    }
}

impl Isa {
    #[inline]
    fn theta(&self, altitude_m: f32) -> f32 { (1.0 - self.L * altitude_m / self.T0).max(0.0) }

    // valid up to ~11 km
    pub fn density(&self, altitude_m: f32) -> f32 {
        // ρ = ρ0 * (T/T0)^{(g/(R L) - 1)}
        let exp = self.g / (self.R * self.L) - 1.0; // ≈ 4.25588
        self.rho0 * self.theta(altitude_m).powf(exp)
    }

    pub fn pressure(&self, altitude_m: f32) -> f32 {
        let exp = self.g / (self.R * self.L);
        self.p0 * self.theta(altitude_m).powf(exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test] fn isa_sea_level_and_decay() {
        let f0 = FluidProps::isa(0.0);
        assert!((f0.density - 1.225).abs() < 1e-4);
        let f5 = FluidProps::isa(5000.0);
        assert!((f5.density - 0.736).abs() < 0.01);
        assert!(f5.pressure < f0.pressure);
    }

    #[test] fn rejects_non_positive_density() {
        let bad = FluidProps { density: 0.0, ..FluidProps::AIR };
        assert!(bad.validate().is_err());
        assert!(FluidProps::WATER.validate().is_ok());
    }
}
