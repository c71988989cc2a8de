use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use serde::Serialize;

use riftflow_core::{RigidBodies, Vec3};
use riftflow_io::load_scene;

#[derive(Parser, Debug)]
#[command(name = "flow_probe", version, about = "Step a riftflow scene and print per-body loads as JSON lines")]
struct Opts {
    /// Path to a scene .json
    scene: PathBuf,

    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    steps: u32,

    /// Tick length in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Print every K-th tick (the last tick is always printed)
    #[arg(long, default_value_t = 60)]
    every: u32,

    /// Pretty-print each record
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,
}

#[derive(Serialize)]
struct BodyLine<'a> {
    name: &'a str,
    pos: Vec3,
    vel: Vec3,
    /// Relative to the fluid, global frame.
    rel: Vec3,
    force: Vec3,
    moment: Vec3,
}

#[derive(Serialize)]
struct TickLine<'a> {
    tick: u64,
    time: f32,
    sources: u32,
    live_nodes: u32,
    expired: u32,
    unapplied: u32,
    hash: String,
    bodies: Vec<BodyLine<'a>>,
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = Opts::parse();
    anyhow::ensure!(opts.dt > 0.0, "--dt must be positive, got {}", opts.dt);
    let every = opts.every.max(1);

    let scene = load_scene(&opts.scene).with_context(|| format!("loading {}", opts.scene.display()))?;
    let mut built = scene.build().context("building world from scene")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for i in 1..=opts.steps {
        let report = built.step(opts.dt);
        if i % every != 0 && i != opts.steps { continue; }

        let bodies = built.handles.iter().filter_map(|h| {
            let body = built.world.body(h.receiver)?;
            let rec = built.world.receiver(h.receiver)?;
            Some(BodyLine {
                name: &h.name,
                pos: built.bodies.position(h.rigid).unwrap_or(rec.pose.pos),
                vel: built.bodies.velocity_at_point(h.rigid, rec.pose.pos),
                rel: rec.relative_velocity,
                force: body.net_global.force,
                moment: body.net_global.moment,
            })
        }).collect();

        let line = TickLine {
            tick: report.tick,
            time: built.world.time(),
            sources: report.sources,
            live_nodes: report.live_nodes,
            expired: report.expired,
            unapplied: report.unapplied,
            hash: hex(&report.hash[..8]),
            bodies,
        };
        let json = if opts.pretty { serde_json::to_string_pretty(&line)? } else { serde_json::to_string(&line)? };
        writeln!(out, "{json}")?;
    }
    Ok(())
}
