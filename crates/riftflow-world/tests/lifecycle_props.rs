//! Property tests over random edit sequences.
//!
//! - vortex node reference counts always match the filaments that use them
//! - identical worlds stepped identically hash identically

use std::collections::BTreeMap;

use proptest::prelude::*;
use riftflow_aero::{AeroModel, BodyShape};
use riftflow_core::{vec3, Kinematic, Lifetime, Pose, SourceId, StrengthCurve, Vec3};
use riftflow_flow::{FilamentParams, FlowKernel, NodeHandle, SourceOwner, UniformFlow};
use riftflow_world::{FlowWorld, FlowWorldBuilder};

#[derive(Clone, Debug)]
enum Op {
    Filament(f32, f32),
    Extend(usize, f32),
    Connect(usize, usize),
    Remove(usize),
    Step,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-3.0f32..3.0, -3.0f32..3.0).prop_map(|(a, b)| Op::Filament(a, b)),
        (any::<usize>(), -3.0f32..3.0).prop_map(|(i, z)| Op::Extend(i, z)),
        (any::<usize>(), any::<usize>()).prop_map(|(i, j)| Op::Connect(i, j)),
        any::<usize>().prop_map(Op::Remove),
        Just(Op::Step),
    ]
}

fn pick<T: Copy>(v: &[T], i: usize) -> Option<T> {
    if v.is_empty() { None } else { Some(v[i % v.len()]) }
}

/// Every live node is referenced exactly `connections` times; every endpoint
/// of a live filament is live.
fn check_nodes(w: &FlowWorld) {
    let mut refs: BTreeMap<NodeHandle, u32> = BTreeMap::new();
    for s in w.sources() {
        if let FlowKernel::Vortex(f) = &s.kernel {
            assert!(w.nodes().is_live(f.start) && w.nodes().is_live(f.end));
            *refs.entry(f.start).or_default() += 1;
            *refs.entry(f.end).or_default() += 1;
        }
    }
    assert_eq!(w.nodes().live_count(), refs.len());
    for (h, n) in refs {
        assert_eq!(w.nodes().connections(h), n);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn node_references_stay_consistent(ops in prop::collection::vec(op(), 1..60)) {
        let mut w = FlowWorldBuilder::new().build().unwrap();
        let params = FilamentParams { dynamic: true, ..FilamentParams::default() };
        let mut handles: Vec<NodeHandle> = Vec::new();
        let mut ids: Vec<SourceId> = Vec::new();
        for o in ops {
            match o {
                Op::Filament(a, b) => {
                    let (id, na, nb) = w.add_filament(vec3(a, 0.0, 0.0), vec3(b, 1.0, 0.0), params, SourceOwner::Global).unwrap();
                    ids.push(id);
                    handles.extend([na, nb]);
                }
                Op::Extend(i, z) => {
                    if let Some(from) = pick(&handles, i) {
                        match w.extend_filament(from, vec3(0.0, 0.0, z), params, SourceOwner::Global) {
                            Ok((id, n)) => { ids.push(id); handles.push(n); }
                            Err(_) => prop_assert!(!w.nodes().is_live(from)),
                        }
                    }
                }
                Op::Connect(i, j) => {
                    if let (Some(a), Some(b)) = (pick(&handles, i), pick(&handles, j)) {
                        let live = w.nodes().is_live(a) && w.nodes().is_live(b);
                        let before = w.nodes().connections(a) + w.nodes().connections(b);
                        match w.connect_filament(a, b, params, SourceOwner::Global) {
                            Ok(id) => {
                                prop_assert!(live);
                                let added = if a == b { 4 } else { 2 };
                                prop_assert_eq!(w.nodes().connections(a) + w.nodes().connections(b), before + added);
                                ids.push(id);
                            }
                            Err(_) => prop_assert!(!live),
                        }
                    }
                }
                Op::Remove(i) => {
                    if !ids.is_empty() {
                        let id = ids.swap_remove(i % ids.len());
                        w.remove_source(id).unwrap();
                    }
                }
                Op::Step => {
                    let report = w.step(1.0 / 60.0, &mut Kinematic);
                    prop_assert_eq!(report.live_nodes as usize, w.nodes().live_count());
                }
            }
            check_nodes(&w);
        }
        for id in ids { w.remove_source(id).unwrap(); }
        prop_assert_eq!(w.nodes().live_count(), 0);
    }
}

fn busy_world(speed: f32) -> FlowWorld {
    let mut w = FlowWorldBuilder::new().build().unwrap();
    w.add_source(Pose::default(), FlowKernel::Uniform(UniformFlow::new(speed, 30.0, 5.0)), SourceOwner::Global).unwrap();
    w.add_temporal_source(
        Pose::default(),
        FlowKernel::Uniform(UniformFlow::new(1.0, 0.0, 0.0)),
        SourceOwner::Global,
        Lifetime::new(0.2, StrengthCurve::FadeInOut),
    ).unwrap();
    let params = FilamentParams { dynamic: true, ..FilamentParams::default() };
    w.add_vortex_ring(Pose::from_pos(vec3(0.0, 2.0, 0.0)), 0.5, 6, params, SourceOwner::Global).unwrap();
    let r = w.add_receiver(Pose::default(), None);
    w.add_body(r, BodyShape::from_dimensions(vec3(2.0, 0.1, 0.5)), vec![AeroModel::drag(), AeroModel::lift()], true).unwrap();
    w
}

fn run(mut w: FlowWorld, steps: usize) -> Vec<[u8; 32]> {
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        let z = i as f32 * 0.01;
        let id = w.bodies().next().map(|b| b.receiver).unwrap();
        w.set_pose(id, Pose::from_pos(Vec3::new(0.0, 0.0, z))).unwrap();
        out.push(w.step(1.0 / 60.0, &mut Kinematic).hash);
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn same_inputs_same_hashes(speed in 0.5f32..20.0) {
        let a = run(busy_world(speed), 30);
        let b = run(busy_world(speed), 30);
        prop_assert_eq!(&a, &b);
        let c = run(busy_world(speed + 1.0), 30);
        prop_assert_ne!(a.last(), c.last());
    }
}
