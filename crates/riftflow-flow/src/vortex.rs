use std::f32::consts::PI;

use serde::{Deserialize, Serialize};
use riftflow_core::{FlowError, FlowResult, Vec3, EPS};

/// Shortest segment the Biot-Savart kernel will divide by.
pub const MIN_FILAMENT_LENGTH: f32 = 1.0e-4;

/// Generational handle into `VortexNodes`. Stale handles never alias a reused slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle { pub index: u32, pub generation: u32 }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SlotState { Free, Live, Retired }

#[derive(Copy, Clone, Debug)]
struct NodeSlot {
    pos: Vec3,
    connections: u32,
    dynamic: u32,
    generation: u32,
    state: SlotState,
}

/// Shared endpoints of vortex filaments.
///
/// A node is live while at least one filament references it. When the last
/// reference goes the node is retired: handles to it stop resolving at once,
/// and the slot is recycled at the next `compact`.
#[derive(Clone, Debug, Default)]
pub struct VortexNodes {
    slots: Vec<NodeSlot>,
    free: Vec<u32>,
    retired: Vec<u32>,
    live: usize,
}

impl VortexNodes {
    pub fn new() -> Self { Self::default() }

    /// Room for `nodes` live nodes before the slot table grows.
    pub fn with_capacity(nodes: usize) -> Self {
        Self { slots: Vec::with_capacity(nodes), ..Self::default() }
    }

    pub fn capacity(&self) -> usize { self.slots.capacity() }

    /// New node with one connection already held by the caller.
    pub fn spawn_connected(&mut self, pos: Vec3, dynamic: bool) -> NodeHandle {
        let slot = NodeSlot { pos, connections: 1, dynamic: dynamic as u32, generation: 0, state: SlotState::Live };
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                let s = &mut self.slots[index as usize];
                let generation = s.generation;
                *s = NodeSlot { generation, ..slot };
                NodeHandle { index, generation }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(slot);
                NodeHandle { index, generation: 0 }
            }
        }
    }

    #[inline]
    fn live_slot(&self, h: NodeHandle) -> Option<&NodeSlot> {
        self.slots.get(h.index as usize)
            .filter(|s| s.generation == h.generation && s.state == SlotState::Live)
    }

    #[inline]
    fn live_slot_mut(&mut self, h: NodeHandle) -> Option<&mut NodeSlot> {
        self.slots.get_mut(h.index as usize)
            .filter(|s| s.generation == h.generation && s.state == SlotState::Live)
    }

    /// Add a reference. Retired nodes cannot be revived.
    pub fn connect(&mut self, h: NodeHandle, dynamic: bool) -> FlowResult<()> {
        let s = self.live_slot_mut(h).ok_or(FlowError::DeadNode(h.index))?;
        s.connections += 1;
        s.dynamic += dynamic as u32;
        Ok(())
    }

    /// Drop a reference; returns true when this retired the node.
    pub fn disconnect(&mut self, h: NodeHandle, dynamic: bool) -> bool {
        let Some(s) = self.live_slot_mut(h) else { return false };
        s.connections -= 1;
        if dynamic { s.dynamic = s.dynamic.saturating_sub(1); }
        if s.connections > 0 { return false; }
        s.state = SlotState::Retired;
        self.live -= 1;
        self.retired.push(h.index);
        true
    }

    #[inline] pub fn is_live(&self, h: NodeHandle) -> bool { self.live_slot(h).is_some() }
    #[inline] pub fn position(&self, h: NodeHandle) -> Option<Vec3> { self.live_slot(h).map(|s| s.pos) }
    pub fn connections(&self, h: NodeHandle) -> u32 { self.live_slot(h).map_or(0, |s| s.connections) }

    /// Advected by the flow when any dynamic filament references it.
    pub fn is_dynamic(&self, h: NodeHandle) -> bool { self.live_slot(h).map_or(false, |s| s.dynamic > 0) }

    pub fn set_position(&mut self, h: NodeHandle, pos: Vec3) -> FlowResult<()> {
        let s = self.live_slot_mut(h).ok_or(FlowError::DeadNode(h.index))?;
        s.pos = pos;
        Ok(())
    }

    pub fn live_count(&self) -> usize { self.live }
    pub fn slot_count(&self) -> usize { self.slots.len() }

    /// All live nodes in slot order.
    pub fn live_nodes(&self) -> impl Iterator<Item = (NodeHandle, Vec3)> + '_ {
        self.slots.iter().enumerate()
            .filter(|(_, s)| s.state == SlotState::Live)
            .map(|(i, s)| (NodeHandle { index: i as u32, generation: s.generation }, s.pos))
    }

    /// Live dynamic nodes in slot order.
    pub fn dynamic_nodes(&self) -> impl Iterator<Item = (NodeHandle, Vec3)> + '_ {
        self.slots.iter().enumerate()
            .filter(|(_, s)| s.state == SlotState::Live && s.dynamic > 0)
            .map(|(i, s)| (NodeHandle { index: i as u32, generation: s.generation }, s.pos))
    }

    /// Recycle retired slots; returns how many were freed.
    pub fn compact(&mut self) -> usize {
        let n = self.retired.len();
        for index in self.retired.drain(..) {
            let s = &mut self.slots[index as usize];
            s.state = SlotState::Free;
            s.generation = s.generation.wrapping_add(1);
            s.connections = 0;
            s.dynamic = 0;
            self.free.push(index);
        }
        n
    }
}

/// Strength and behaviour of a filament, independent of its endpoints.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilamentParams {
    pub circulation: f32,
    pub core_radius: f32,
    /// Endpoints move with the local flow.
    pub dynamic: bool,
}

impl Default for FilamentParams {
    fn default() -> Self { Self { circulation: 1.0, core_radius: 0.1, dynamic: false } }
}

impl FilamentParams {
    pub fn between(self, start: NodeHandle, end: NodeHandle) -> VortexFilament {
        VortexFilament { start, end, circulation: self.circulation, core_radius: self.core_radius, dynamic: self.dynamic }
    }

    pub fn validate(&self) -> FlowResult<()> {
        if !(self.core_radius > 0.0) {
            return Err(FlowError::invalid("filament core_radius", self.core_radius, "> 0"));
        }
        if !self.circulation.is_finite() {
            return Err(FlowError::invalid("filament circulation", self.circulation, "finite"));
        }
        Ok(())
    }
}

/// Straight vortex segment between two shared nodes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VortexFilament {
    pub start: NodeHandle,
    pub end: NodeHandle,
    pub circulation: f32,
    pub core_radius: f32,
    pub dynamic: bool,
}

impl VortexFilament {
    pub fn validate(&self) -> FlowResult<()> {
        if !(self.core_radius > 0.0) {
            return Err(FlowError::invalid("filament core_radius", self.core_radius, "> 0"));
        }
        Ok(())
    }

    /// Zero if either endpoint has been retired.
    pub fn velocity(&self, p: Vec3, nodes: &VortexNodes) -> Vec3 {
        match (nodes.position(self.start), nodes.position(self.end)) {
            (Some(a), Some(b)) => biot_savart(p, a, b, self.circulation, self.core_radius),
            _ => Vec3::ZERO,
        }
    }
}

/// Induced velocity at `p` of a finite straight filament a->b with a linear
/// (solid-body) core of radius `core`.
pub fn biot_savart(p: Vec3, a: Vec3, b: Vec3, circulation: f32, core: f32) -> Vec3 {
    let ab = b - a;
    let axis = ab / ab.length().max(MIN_FILAMENT_LENGTH);
    let pa = p - a;
    let pb = p - b;
    let (la, lb) = (pa.length(), pb.length());
    if la <= EPS || lb <= EPS { return Vec3::ZERO; }

    let along = pa.dot(axis);
    let r = (pa - axis * along).length();
    let cos_a = along / la;
    let cos_b = pb.dot(axis) / lb;

    let rr = r.max(core);
    let mut speed = circulation / (4.0 * PI * rr) * (cos_a - cos_b);
    if r < core { speed *= r / core; }
    axis.cross(pa).normalize_or_zero() * speed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test] fn right_hand_rule() {
        let v = biot_savart(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 10.0), 1.0, 0.01);
        assert!(v.y > 0.0);
        assert!(v.x.abs() < 1e-6 && v.z.abs() < 1e-6);
        // long filament approaches Γ/(2πr)
        assert!((v.y - 1.0 / (2.0 * PI)).abs() < 2e-3);
    }

    #[test] fn far_field_converges_as_the_filament_grows() {
        let target = 1.0 / (2.0 * PI);
        let mut last = f32::INFINITY;
        for len in [2.0_f32, 4.0, 8.0, 16.0, 64.0] {
            let half = 0.5 * len;
            let v = biot_savart(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -half), Vec3::new(0.0, 0.0, half), 1.0, 0.01);
            let err = (v.length() - target).abs();
            assert!(err < last, "error grew at L={len}: {err} >= {last}");
            last = err;
        }
        assert!(last < 1e-4);
    }

    #[test] fn core_is_linear() {
        let (a, b) = (Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0));
        let (gamma, rc) = (2.0, 0.5);
        let cos = |z: f32, r: f32| z / (z * z + r * r).sqrt();
        for d in [0.1_f32, 0.25, 0.4] {
            let v = biot_savart(Vec3::new(d, 0.0, 0.0), a, b, gamma, rc);
            let expected = (d / rc) * gamma / (4.0 * PI * rc) * (cos(1.0, d) - cos(-1.0, d));
            assert!((v.length() - expected).abs() < 1e-5, "d={d}: {} vs {expected}", v.length());
        }
        assert_eq!(biot_savart(Vec3::new(0.0, 0.0, 0.3), a, b, gamma, rc), Vec3::ZERO);
    }

    #[test] fn degenerate_filament_is_silent() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        let v = biot_savart(Vec3::new(2.0, 0.0, 0.0), a, a, 5.0, 0.1);
        assert!(v.is_finite());
        assert!(v.length() < 1e-6);
    }

    #[test] fn node_lifecycle() {
        let mut nodes = VortexNodes::new();
        let a = nodes.spawn_connected(Vec3::ZERO, false);
        nodes.connect(a, true).unwrap();
        assert_eq!(nodes.connections(a), 2);
        assert!(nodes.is_dynamic(a));
        assert!(!nodes.disconnect(a, true));
        assert!(!nodes.is_dynamic(a));
        assert!(nodes.disconnect(a, false));
        assert!(!nodes.is_live(a));
        assert!(nodes.connect(a, false).is_err());
        assert_eq!(nodes.live_count(), 0);

        assert_eq!(nodes.compact(), 1);
        let b = nodes.spawn_connected(Vec3::X, false);
        assert_eq!(b.index, a.index);
        assert_ne!(b.generation, a.generation);
        assert!(!nodes.is_live(a));
        assert_eq!(nodes.position(b), Some(Vec3::X));
    }
}
