use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use arbor::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scene_with_capacity(max_entities: usize) -> Scene {
    Scene::with_config(SceneConfig {
        max_entities,
        ..SceneConfig::default()
    })
}

struct A;
struct B;
struct C;
struct D;

#[derive(Default)]
struct Picky;

impl System for Picky {
    fn signature(&self) -> SystemSignature {
        SystemSignature::new()
            .require_all::<A>()
            .require_all::<B>()
            .require_one::<C>()
            .require_one::<D>()
    }

    fn update(&mut self, _scene: &mut Scene, _entities: &[EntityId], _dt: f32) {}
}

fn members<S: System>(scene: &Scene) -> Vec<EntityId> {
    scene
        .system_entities::<S>()
        .map(|set| set.iter().copied().collect())
        .unwrap_or_default()
}

// ── Identity ─────────────────────────────────────────────────────────────

#[test]
fn ids_are_never_handed_out_twice_while_live() {
    init_logging();
    let mut scene = scene_with_capacity(16);
    let mut live: BTreeSet<EntityId> = BTreeSet::new();
    let mut seed: u32 = 0x2545_f491;

    for _ in 0..500 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let create = live.is_empty() || (live.len() < 16 && seed % 3 != 0);
        if create {
            let id = scene.add_new_entity().id();
            assert!(id.is_valid());
            assert!(live.insert(id), "{id:?} handed out while still live");
        } else {
            let victim = *live.iter().nth((seed as usize / 7) % live.len()).unwrap();
            scene.destroy_entity(victim);
            live.remove(&victim);
        }
        assert_eq!(scene.entity_count(), live.len());
    }
}

#[test]
fn destroying_subtree_frees_every_id() {
    init_logging();
    let mut scene = scene_with_capacity(7);
    let root = scene.add_new_entity().id();
    let mut subtree = vec![root];
    for parent_index in [0, 0, 1, 1, 3] {
        let id = scene.add_new_entity().id();
        scene.assign_child(subtree[parent_index], id).unwrap();
        subtree.push(id);
    }
    let bystander = scene.add_new_entity().id();
    assert_eq!(scene.entity_count(), 7);

    assert_eq!(scene.destroy_entity(root), subtree.len());
    assert_eq!(scene.entity_count(), 1);
    assert!(scene.is_alive(bystander));
    for &id in &subtree {
        assert!(!scene.is_alive(id));
    }

    let reused: BTreeSet<EntityId> = (0..subtree.len())
        .map(|_| scene.add_new_entity().id())
        .collect();
    assert_eq!(reused, subtree.iter().copied().collect());
}

#[test]
fn destroying_a_child_detaches_it_from_its_parent() {
    let mut scene = Scene::new();
    let parent = scene.add_new_entity().id();
    let child = scene.add_new_entity().id();
    scene.assign_child(parent, child).unwrap();
    scene.destroy_entity(child);
    assert!(scene.entity(parent).children().is_empty());
    scene.hierarchy().check_consistency().unwrap();
}

// ── Components and membership ────────────────────────────────────────────

#[test]
fn signature_agrees_with_stores() {
    init_logging();
    let mut scene = Scene::new();
    let e = scene.add_new_entity().id();

    let check = |scene: &Scene| {
        let sig = scene.signature(e);
        let reg = scene.registry();
        for (has, in_store, id) in [
            (
                scene.has_component::<A>(e),
                scene.store::<A>().is_some_and(|s| s.contains(e)),
                reg.lookup_component::<A>(),
            ),
            (
                scene.has_component::<B>(e),
                scene.store::<B>().is_some_and(|s| s.contains(e)),
                reg.lookup_component::<B>(),
            ),
        ] {
            assert_eq!(has, in_store);
            assert_eq!(has, id.is_some_and(|id| sig.contains(id)));
        }
    };

    check(&scene);
    scene.add_component(e, A);
    check(&scene);
    scene.add_component(e, B);
    check(&scene);
    scene.remove_component::<A>(e);
    check(&scene);
    scene.remove_component::<A>(e);
    check(&scene);
    scene.remove_component::<B>(e);
    check(&scene);
    assert!(scene.signature(e).is_empty());
}

#[test]
fn require_all_and_require_one_membership() {
    init_logging();
    let mut scene = Scene::new();
    scene.register_system::<Picky>();

    let abc = scene.add_new_entity().insert(A).insert(B).insert(C).id();
    let ac = scene.add_new_entity().insert(A).insert(C).id();
    let ab = scene.add_new_entity().insert(A).insert(B).id();
    assert_eq!(members::<Picky>(&scene), vec![abc]);

    scene.add_component(ab, D);
    assert_eq!(members::<Picky>(&scene), vec![abc, ab]);

    scene.remove_component::<C>(abc);
    scene.add_component(ac, B);
    assert_eq!(members::<Picky>(&scene), vec![ac, ab]);

    scene.destroy_entity(ab);
    assert_eq!(members::<Picky>(&scene), vec![ac]);
}

// ── Systems ──────────────────────────────────────────────────────────────

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder {
    name: &'static str,
    log: Log,
}

impl Recorder {
    fn push(&self, event: &str) {
        self.log.borrow_mut().push(format!("{}.{event}", self.name));
    }
}

struct First(Recorder);
struct Second(Recorder);

macro_rules! recording_system {
    ($ty:ident) => {
        impl System for $ty {
            fn signature(&self) -> SystemSignature {
                SystemSignature::new()
            }
            fn start(&mut self, _scene: &mut Scene) {
                self.0.push("start");
            }
            fn pre_update(&mut self, _scene: &mut Scene, _entities: &[EntityId], _dt: f32) {
                self.0.push("pre");
            }
            fn update(&mut self, _scene: &mut Scene, _entities: &[EntityId], _dt: f32) {
                self.0.push("update");
            }
            fn late_update(&mut self, _scene: &mut Scene, _entities: &[EntityId], _dt: f32) {
                self.0.push("late");
            }
            fn destroy(&mut self, _scene: &mut Scene) {
                self.0.push("destroy");
            }
        }
    };
}

recording_system!(First);
recording_system!(Second);

fn recorder(name: &'static str, log: &Log) -> Recorder {
    Recorder {
        name,
        log: Rc::clone(log),
    }
}

#[test]
fn phases_run_in_order_across_systems() {
    init_logging();
    let log: Log = Rc::default();
    let mut scene = Scene::new();
    scene.add_system(First(recorder("first", &log)));
    scene.add_system(Second(recorder("second", &log)));
    scene.start();
    scene.update(0.016);

    assert_eq!(
        *log.borrow(),
        [
            "first.start",
            "second.start",
            "first.pre",
            "second.pre",
            "first.update",
            "second.update",
            "first.late",
            "second.late",
        ]
    );
}

#[test]
fn dropping_a_started_scene_destroys_systems() {
    let log: Log = Rc::default();
    {
        let mut scene = Scene::new();
        scene.add_system(First(recorder("first", &log)));
        scene.start();
    }
    assert_eq!(log.borrow().last().map(String::as_str), Some("first.destroy"));
}

#[test]
fn unregister_calls_destroy_only_after_start() {
    let log: Log = Rc::default();
    let mut scene = Scene::new();
    scene.add_system(First(recorder("first", &log)));
    scene.unregister_system::<First>();
    assert!(log.borrow().is_empty());

    scene.add_system(First(recorder("first", &log)));
    scene.start();
    scene.unregister_system::<First>();
    assert_eq!(*log.borrow(), ["first.start", "first.destroy"]);
    assert!(!scene.has_system::<First>());
}

struct Marked;

/// Destroys every entity it is given, and checks it can't be taken out of
/// the scene while running.
#[derive(Default)]
struct Reaper {
    saw: usize,
    busy_checked: bool,
}

impl System for Reaper {
    fn signature(&self) -> SystemSignature {
        SystemSignature::new().require_all::<Marked>()
    }

    fn update(&mut self, scene: &mut Scene, entities: &[EntityId], _dt: f32) {
        self.saw += entities.len();
        for &id in entities {
            if scene.is_alive(id) {
                scene.destroy_entity(id);
            }
        }
        assert!(scene.system::<Reaper>().is_none());
        assert!(matches!(
            scene.try_unregister_system::<Reaper>(),
            Err(SceneError::SystemBusy(_))
        ));
        self.busy_checked = true;
    }
}

#[test]
fn systems_iterate_a_snapshot() {
    init_logging();
    let mut scene = Scene::new();
    scene.register_system::<Reaper>();
    let parent = scene.add_new_entity().insert(Marked).id();
    let child = scene.add_new_entity().insert(Marked).id();
    scene.assign_child(parent, child).unwrap();

    scene.update(0.016);

    let reaper = scene.system::<Reaper>().unwrap();
    assert_eq!(reaper.saw, 2);
    assert!(reaper.busy_checked);
    assert_eq!(scene.entity_count(), 0);
    assert!(members::<Reaper>(&scene).is_empty());
}

// ── Reset and snapshots ─────────────────────────────────────────────────

#[test]
fn snapshot_round_trips_through_json() {
    init_logging();
    let mut scene = Scene::new();
    let sun = scene
        .add_new_entity()
        .set_name("Sun")
        .set_local_position(Vec3::new(0.0, 1.0, 0.0))
        .set_local_rotation(Quat::from_rotation_y(0.6))
        .id();
    let earth = scene.add_new_entity().set_name("Earth").id();
    scene.assign_child(sun, earth).unwrap();
    scene
        .entity_mut(earth)
        .set_local_position(Vec3::new(10.0, 0.0, 0.0));
    scene.set_active_camera(earth);
    scene.update(0.016);
    let earth_position = scene.entity(earth).position();

    let json = scene.snapshot().to_json().unwrap();
    let snapshot = SceneSnapshot::from_json(&json).unwrap();

    let mut restored = Scene::new();
    let map = restored.restore(&snapshot);
    restored.update(0.016);

    let new_earth = restored.named("Earth");
    assert_eq!(map[&earth], new_earth);
    assert_eq!(restored.entity(new_earth).parent(), Some(restored.named("Sun")));
    assert!(restored
        .entity(new_earth)
        .position()
        .abs_diff_eq(earth_position, 1e-4));
    assert_eq!(restored.active_camera(), Some(new_earth));
}

#[test]
fn reset_keeps_systems_and_empties_scene() {
    let mut scene = Scene::new();
    scene.register_system::<Picky>();
    let e = scene.add_new_entity().insert(A).insert(B).insert(C).id();
    scene.set_active_camera(e);
    scene.update(0.5);

    scene.reset();
    assert_eq!(scene.entity_count(), 0);
    assert_eq!(scene.active_camera(), None);
    assert!(members::<Picky>(&scene).is_empty());
    assert!(scene.has_system::<Picky>());
    assert_eq!(scene.time().frame_count(), 0);
    assert!(scene.store::<A>().is_some_and(|s| s.is_empty()));
}

#[test]
fn config_file_sets_capacity() {
    let config = SceneConfig::from_json_str(r#"{ "max_entities": 2 }"#).unwrap();
    let mut scene = Scene::with_config(config);
    scene.add_new_entity();
    scene.add_new_entity();
    assert!(matches!(
        scene.try_add_new_entity().err(),
        Some(SceneError::PoolExhausted { capacity: 2 })
    ));
}

#[test]
#[should_panic(expected = "invalid configuration")]
fn zero_capacity_config_panics() {
    Scene::with_config(SceneConfig {
        max_entities: 0,
        ..SceneConfig::default()
    });
}

#[test]
fn huge_delta_does_not_stop_the_frame() {
    let log: Log = Rc::default();
    let mut scene = Scene::new();
    scene.add_system(First(recorder("first", &log)));
    scene.update(1.0e20);
    assert_eq!(scene.time().frame_count(), 1);
    assert!(log.borrow().iter().any(|e| e == "first.update"));
}
