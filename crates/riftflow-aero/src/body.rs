use glam::Quat;
use serde::{Deserialize, Serialize};
use riftflow_core::{FluidProps, Mat3, ReceiverId, SourceId, Vec3};
use riftflow_flow::{FlowReceiver, FluidBoundary};

use crate::load::AeroLoad;
use crate::model::AeroModel;

/// Which end of the wing chord axis a control surface hinges on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordEnd { Positive, Negative }

/// Hinged flap or slat. Acts as a flap on the downstream edge and as a slat
/// on the upstream edge, whichever way the flow currently runs.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlSurface {
    /// Fraction of the chord, 0..1.
    pub chord_fraction: f32,
    /// Radians, positive trailing-edge down.
    #[serde(default)]
    pub deflection: f32,
    pub edge: ChordEnd,
}

impl ControlSurface {
    /// True when the hinge edge is downstream for in-plane flow direction `chord_dir`
    /// (wing-frame chord component of the relative velocity).
    #[inline]
    pub fn is_downstream(&self, chord_dir: f32) -> bool {
        match self.edge { ChordEnd::Positive => chord_dir < 0.0, ChordEnd::Negative => chord_dir > 0.0 }
    }

    /// Thin-aerofoil flap effectiveness.
    pub fn flap_effectiveness(&self) -> f32 {
        let e = self.chord_fraction.clamp(0.0, 1.0);
        let theta = (2.0 * e - 1.0).acos();
        1.0 - (theta - theta.sin()) / std::f32::consts::PI
    }
}

/// Geometric description of an aerodynamic body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyShape {
    /// Multiplied by `scale` to give dimensions (full extents, metres). The
    /// owning receiver's pose scale is applied on top, see [`AeroBody::set_pose_scale`].
    #[serde(default = "unit")]
    pub relative_dimensions: Vec3,
    #[serde(default = "unit")]
    pub scale: Vec3,
    /// Camber offset in body-local frame; only the thickness-axis component matters.
    #[serde(default)]
    pub camber: Vec3,
    /// Span of the whole wing a panel belongs to; 0 when standalone.
    #[serde(default)]
    pub group_span: f32,
    #[serde(default)]
    pub control_surfaces: Vec<ControlSurface>,
}

fn unit() -> Vec3 { Vec3::ONE }

impl Default for BodyShape {
    fn default() -> Self {
        Self { relative_dimensions: Vec3::ONE, scale: Vec3::ONE, camber: Vec3::ZERO, group_span: 0.0, control_surfaces: Vec::new() }
    }
}

impl BodyShape {
    pub fn from_dimensions(dims: Vec3) -> Self { Self { relative_dimensions: dims, ..Self::default() } }
    pub fn dimensions(&self) -> Vec3 { (self.relative_dimensions * self.scale).abs() }
}

/// Span, thickness and chord axes picked from the body dimensions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WingAxes {
    pub span: usize,
    pub thickness: usize,
    pub chord: usize,
    /// Body-local -> wing frame (x = span, y = thickness, z = chord).
    pub to_wing: Mat3,
}

impl WingAxes {
    /// Largest dimension is span, smallest is thickness; ties keep axis order.
    pub fn from_dimensions(dims: Vec3) -> Self {
        let mut idx = [0usize, 1, 2];
        idx.sort_by(|a, b| dims[*a].total_cmp(&dims[*b]));
        let (thickness, chord, span) = (idx[0], idx[1], idx[2]);
        let e_span = Mat3::IDENTITY.col(span);
        let e_thick = Mat3::IDENTITY.col(thickness);
        let e_chord = e_span.cross(e_thick);
        Self { span, thickness, chord, to_wing: Mat3::from_cols(e_span, e_thick, e_chord).transpose() }
    }

    #[inline] pub fn from_wing(&self) -> Mat3 { self.to_wing.transpose() }
}

/// Everything a model reads in one tick. Vectors are body-local.
#[derive(Clone, Debug)]
pub struct BodyState {
    pub shape: BodyShape,
    pub dimensions: Vec3,
    pub axes: WingAxes,
    /// Own velocity minus fluid velocity.
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub fluid: FluidProps,
    /// Fluid outside every domain; the dry side of a free surface.
    pub ambient: FluidProps,
    pub dynamic_pressure: f32,
    pub gravity: Vec3,
    pub position: Vec3,
    pub rotation: Quat,
    pub mass: f32,
    pub dt: f32,
    pub boundary: Option<FluidBoundary>,
}

impl BodyState {
    pub fn new(shape: BodyShape) -> Self {
        let dimensions = shape.dimensions();
        Self {
            axes: WingAxes::from_dimensions(dimensions),
            shape, dimensions,
            velocity: Vec3::ZERO, angular_velocity: Vec3::ZERO,
            fluid: FluidProps::AIR, ambient: FluidProps::AIR, dynamic_pressure: 0.0,
            gravity: Vec3::ZERO, position: Vec3::ZERO, rotation: Quat::IDENTITY,
            mass: 0.0, dt: 0.0, boundary: None,
        }
    }

    /// Largest control-surface thickness growth: flap chord * |sin δ|.
    pub fn deflection_thickness(&self) -> f32 {
        let chord = self.dimensions[self.axes.chord];
        self.shape.control_surfaces.iter()
            .map(|c| c.chord_fraction.clamp(0.0, 1.0) * chord * c.deflection.sin().abs())
            .fold(0.0, f32::max)
    }
}

/// A receiver with a shape and an ordered list of load models.
#[derive(Clone, Debug)]
pub struct AeroBody {
    pub receiver: ReceiverId,
    pub state: BodyState,
    pub models: Vec<AeroModel>,
    /// Per-model load of the last pass, body-local.
    pub loads: Vec<AeroLoad>,
    pub net: AeroLoad,
    pub net_global: AeroLoad,
    /// Displacement source following this body, if any.
    pub displacement: Option<SourceId>,
    pose_scale: Vec3,
    dims_dirty: bool,
}

impl AeroBody {
    pub fn new(receiver: ReceiverId, shape: BodyShape, models: Vec<AeroModel>) -> Self {
        let loads = vec![AeroLoad::ZERO; models.len()];
        Self {
            receiver, state: BodyState::new(shape), models, loads,
            net: AeroLoad::ZERO, net_global: AeroLoad::ZERO, displacement: None, pose_scale: Vec3::ONE, dims_dirty: true,
        }
    }

    pub fn dimensions(&self) -> Vec3 { self.state.dimensions }

    /// Shape dimensions under the current pose scale, without waiting for the next pass.
    pub fn scaled_dimensions(&self) -> Vec3 { (self.state.shape.dimensions() * self.pose_scale).abs() }

    pub fn pose_scale(&self) -> Vec3 { self.pose_scale }

    /* ---- shape edits; each refreshes model constants before the next pass ---- */

    pub fn set_scale(&mut self, scale: Vec3) {
        if self.state.shape.scale != scale { self.state.shape.scale = scale; self.dims_dirty = true; }
    }

    /// Scale of the receiver's pose; composes with `BodyShape::scale`.
    pub fn set_pose_scale(&mut self, scale: Vec3) {
        if self.pose_scale != scale { self.pose_scale = scale; self.dims_dirty = true; }
    }

    pub fn set_relative_dimensions(&mut self, dims: Vec3) {
        if self.state.shape.relative_dimensions != dims { self.state.shape.relative_dimensions = dims; self.dims_dirty = true; }
    }

    pub fn set_group_span(&mut self, span: f32) {
        self.state.shape.group_span = span;
        self.dims_dirty = true;
    }

    pub fn set_camber(&mut self, camber: Vec3) {
        self.state.shape.camber = camber;
        self.dims_dirty = true;
    }

    /// Returns false for an out-of-range surface index.
    pub fn set_deflection(&mut self, surface: usize, radians: f32) -> bool {
        match self.state.shape.control_surfaces.get_mut(surface) {
            Some(c) => { c.deflection = radians; self.dims_dirty = true; true }
            None => false,
        }
    }

    /// Copy this tick's kinematic and fluid inputs from the receiver.
    pub fn sync(&mut self, r: &FlowReceiver, ambient: FluidProps, gravity: Vec3, mass: f32, dt: f32, boundary: Option<FluidBoundary>) {
        let s = &mut self.state;
        s.velocity = r.relative_velocity_local;
        s.angular_velocity = r.angular_velocity_local;
        s.fluid = r.fluid;
        s.ambient = ambient;
        s.dynamic_pressure = 0.5 * r.fluid.density * s.velocity.length_squared();
        s.gravity = r.pose.inverse_transform_direction(gravity);
        s.position = r.pose.pos;
        s.rotation = r.pose.rot;
        s.mass = mass;
        s.dt = dt;
        s.boundary = boundary;
    }

    fn refresh_dimensions(&mut self) {
        self.state.dimensions = self.scaled_dimensions();
        self.state.axes = WingAxes::from_dimensions(self.state.dimensions);
        for m in &mut self.models { m.update_dimensions(&self.state); }
        self.dims_dirty = false;
    }

    /// Run every model and sum into `net` (local) and `net_global`.
    pub fn compute_loads(&mut self) -> AeroLoad {
        if self.dims_dirty { self.refresh_dimensions(); }
        self.loads.resize(self.models.len(), AeroLoad::ZERO);
        let mut net = AeroLoad::ZERO;
        for (m, slot) in self.models.iter_mut().zip(self.loads.iter_mut()) {
            let l = m.get_load(&self.state);
            *slot = if l.is_finite() { l } else { AeroLoad::ZERO };
            net += *slot;
        }
        self.net = net;
        self.net_global = net.to_global(self.state.rotation);
        self.net
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test] fn wing_axes_pick_span_thickness_chord() {
        let a = WingAxes::from_dimensions(Vec3::new(0.3, 0.02, 2.0));
        assert_eq!((a.span, a.thickness, a.chord), (2, 1, 0));
        // span (z) x thickness (y) = -x; the wing frame is a rotation
        let w = a.to_wing * Vec3::new(1.0, 2.0, 3.0);
        assert!((w - Vec3::new(3.0, 2.0, -1.0)).length() < 1e-6);
        assert!((a.from_wing() * w - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test] fn flap_effectiveness_endpoints() {
        let mut c = ControlSurface { chord_fraction: 0.0, deflection: 0.0, edge: ChordEnd::Negative };
        assert!(c.flap_effectiveness().abs() < 1e-6);
        c.chord_fraction = 1.0;
        assert!((c.flap_effectiveness() - 1.0).abs() < 1e-6);
        c.chord_fraction = 0.25;
        let t = c.flap_effectiveness();
        assert!(t > 0.5 && t < 0.7);
        assert!(c.is_downstream(1.0) && !c.is_downstream(-1.0));
    }

    #[test] fn dimension_edits_mark_dirty() {
        let mut b = AeroBody::new(ReceiverId(1), BodyShape::from_dimensions(Vec3::new(1.0, 2.0, 3.0)), vec![]);
        b.compute_loads();
        b.set_scale(Vec3::splat(2.0));
        b.compute_loads();
        assert_eq!(b.dimensions(), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(b.net, AeroLoad::ZERO);
        // pose scale multiplies, it does not replace
        b.set_pose_scale(Vec3::new(1.0, 0.5, 1.0));
        assert_eq!(b.scaled_dimensions(), Vec3::new(2.0, 2.0, 6.0));
        b.compute_loads();
        assert_eq!(b.dimensions(), Vec3::new(2.0, 2.0, 6.0));
        assert_eq!(b.state.shape.scale, Vec3::splat(2.0));
    }
}
