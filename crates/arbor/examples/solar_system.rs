//! Entity Hierarchies — headless solar system demo.
//!
//! Planets orbit the sun and moons orbit their planet, all through parent
//! rotation. After a few simulated seconds one planet is destroyed (its moon
//! goes with it) and the surviving tree is saved as a snapshot.
//!
//! Run with: `RUST_LOG=info cargo run -p arbor --example solar_system`

use arbor::prelude::*;

// ── Markers ──────────────────────────────────────────────────────────────

struct Planet;

// ── Orbit component ─────────────────────────────────────────────────────

/// Spin the owning pivot around +Y.
struct Orbit {
    speed: f32,
}

// ── Systems ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct OrbitSystem;

impl System for OrbitSystem {
    fn signature(&self) -> SystemSignature {
        SystemSignature::new().require_all::<Orbit>()
    }

    fn update(&mut self, scene: &mut Scene, entities: &[EntityId], dt: f32) {
        for &id in entities {
            let speed = scene.component::<Orbit>(id).speed;
            let rotation = scene.entity(id).local_rotation() * Quat::from_rotation_y(speed * dt);
            scene.entity_mut(id).set_local_rotation(rotation);
        }
    }
}

#[derive(Default)]
struct PlanetReport {
    frames: u32,
}

impl System for PlanetReport {
    fn signature(&self) -> SystemSignature {
        SystemSignature::new().require_all::<Planet>()
    }

    fn update(&mut self, _scene: &mut Scene, _entities: &[EntityId], _dt: f32) {}

    fn late_update(&mut self, scene: &mut Scene, entities: &[EntityId], _dt: f32) {
        self.frames += 1;
        if self.frames % 60 != 0 {
            return;
        }
        for &id in entities {
            let planet = scene.entity(id);
            log::info!("{:>8} at {:.1}", planet.name(), planet.position());
        }
    }
}

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    scene.register_system::<OrbitSystem>();
    scene.register_system::<PlanetReport>();

    let sun = scene
        .add_new_entity()
        .set_name("Sun")
        .set_local_scale(Vec3::splat(4.0))
        .id();
    scene.set_active_camera(sun);

    let planets = [
        ("Mercury", 6.0, 1.6, None),
        ("Earth", 12.0, 1.0, Some(("Moon", 1.5, 4.0))),
        ("Mars", 18.0, 0.5, Some(("Phobos", 1.0, 6.0))),
    ];
    for (name, distance, speed, moon) in planets {
        let planet = spawn_orbiter(&mut scene, sun, name, distance, speed);
        scene.add_component(planet, Planet);
        if let Some((moon_name, moon_distance, moon_speed)) = moon {
            spawn_orbiter(&mut scene, planet, moon_name, moon_distance, moon_speed);
        }
    }

    scene.start();
    for _ in 0..180 {
        scene.update(1.0 / 60.0);
    }

    let mars = scene.named("Mars");
    let pivot = scene.entity(mars).parent().unwrap_or(mars);
    let destroyed = scene.destroy_entity(pivot);
    log::info!("destroyed Mars with {} entities", destroyed);
    scene.update(1.0 / 60.0);

    #[cfg(feature = "diagnostics")]
    {
        match scene.diagnostics_snapshot().to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("diagnostics: {e}"),
        }
    }

    match scene.snapshot().to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("snapshot: {e}"),
    }

    scene.shutdown();
}

/// A spinning pivot under `parent` with the visible body offset from it.
fn spawn_orbiter(scene: &mut Scene, parent: EntityId, name: &str, distance: f32, speed: f32) -> EntityId {
    let pivot = scene
        .add_new_entity()
        .set_name(format!("{name} pivot"))
        .insert(Orbit { speed })
        .id();
    if let Err(e) = scene.assign_child(parent, pivot) {
        log::error!("{e}");
    }
    // Set after attaching, so the value is relative to the new parent.
    scene.entity_mut(pivot).set_local_position(Vec3::ZERO);

    let body = scene.add_new_entity().set_name(name).id();
    if let Err(e) = scene.assign_child(pivot, body) {
        log::error!("{e}");
    }
    scene
        .entity_mut(body)
        .set_local_position(Vec3::new(distance, 0.0, 0.0));
    body
}
