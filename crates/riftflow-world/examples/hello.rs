use riftflow_aero::{AeroModel, BodyShape};
use riftflow_core::{vec3, FluidProps, Gravity, Pose};
use riftflow_dynamics::{BodyDesc, Bodies};
use riftflow_flow::{FlowKernel, SourceOwner, UniformFlow};
use riftflow_geom::{DomainShape, MassProps};
use riftflow_world::FlowWorldBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let gravity = Gravity::default();
    let mut w = FlowWorldBuilder::new().with_gravity(gravity).build()?;
    let mut bodies = Bodies::default();

    // Pool of water, surface at y = 0
    let pool = w.add_domain(Pose::from_pos(vec3(0.0, -2.0, 0.0)), DomainShape::Box { hx: 10.0, hy: 2.0, hz: 10.0 }, FluidProps::WATER)?;
    w.domain_mut(pool)?.free_surface = true;

    // Breeze along +x
    w.add_source(Pose::default(), FlowKernel::Uniform(UniformFlow::new(5.0, 90.0, 0.0)), SourceOwner::Global)?;

    // Wooden crate dropped into the pool
    let dims = vec3(0.5, 0.5, 0.5);
    let h = bodies.add(BodyDesc::dynamic(vec3(0.0, 1.0, 0.0), MassProps::from_ellipsoid(dims, 600.0)));
    let r = w.add_receiver(Pose::from_pos(vec3(0.0, 1.0, 0.0)), Some(h));
    w.add_body(r, BodyShape::from_dimensions(dims), vec![AeroModel::drag(), AeroModel::advanced_buoyancy()], false)?;

    let dt = 1.0 / 60.0;
    for step in 0..240 {
        let report = w.step(dt, &mut bodies);
        bodies.integrate_all(&gravity, dt);
        if step % 30 == 0 {
            let pos = bodies.position(h).unwrap_or_default();
            println!("step {step:03}  y={:+.3}  x={:+.3}  load={:.2}N  hash={:02x?}", pos.y, pos.x, report.load_sum, &report.hash[..4]);
        }
    }
    Ok(())
}
