use std::path::PathBuf;

use riftflow_io::{load_scene, parse_scene, SceneError};

fn harbour() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenes/harbour.json")
}

#[test]
fn harbour_scene_builds_and_runs() {
    let scene = load_scene(&harbour()).unwrap();
    assert_eq!(scene.domains.len(), 1);
    assert_eq!(scene.bodies.len(), 2);

    let mut built = scene.build().unwrap();
    // 3 listed sources, 12 ring filaments, 1 displacement source for the kite
    assert_eq!(built.world.source_count(), 16);
    assert_eq!(built.world.nodes().live_count(), 12);

    let kite = built.handles.iter().find(|h| h.name == "kite").unwrap().receiver;
    let gust = built.world.sources().map(|s| s.id).nth(2).unwrap();
    assert!(built.world.is_ignored(kite, gust));

    let mut expired = 0;
    for _ in 0..300 {
        let report = built.step(1.0 / 60.0);
        assert_eq!(report.unapplied, 0);
        expired += report.expired;
    }
    // the 4 s gust is gone after 5 s
    assert_eq!(expired, 1);
    assert_eq!(built.world.source_count(), 15);

    for h in &built.handles {
        let body = built.world.body(h.receiver).unwrap();
        assert!(body.net_global.is_finite(), "{} load is not finite", h.name);
        assert!(built.bodies.position(h.rigid).unwrap().is_finite());
    }
    // the kite is fixed but still loaded by the breeze
    assert!(built.world.body(kite).unwrap().net_global.force.length() > 0.0);
}

#[test]
fn same_scene_same_hashes() {
    let scene = load_scene(&harbour()).unwrap();
    let mut a = scene.build().unwrap();
    let mut b = scene.build().unwrap();
    for _ in 0..60 {
        assert_eq!(a.step(1.0 / 60.0).hash, b.step(1.0 / 60.0).hash);
    }
}

#[test]
fn ignore_index_must_exist() {
    let s = parse_scene(
        r#"{"bodies":[{"name":"b","shape":{},"models":[{"model":"drag"}],"ignore":[3]}]}"#,
    ).unwrap();
    match s.build() {
        Err(SceneError::SourceIndex { index, count, .. }) => { assert_eq!(index, 3); assert_eq!(count, 0); }
        Err(e) => panic!("unexpected error {e}"),
        Ok(_) => panic!("built with a dangling ignore"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(load_scene(&harbour().with_file_name("nope.json")), Err(SceneError::Io(_))));
}
