//! Hearth Engine Runtime
//!
//! Boots a demo scene, binds the script bridge and runs a bounded number of
//! fixed ticks with the sandbox scripts attached.
//!
//! Usage: `hearth [settings.json]`

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context as _, Result};
use glam::{Vec2, Vec3};
use hearth_core::scene::{
    BodyType, BoxCollider2DComponent, CameraComponent, CircleRendererComponent,
    Rigidbody2DComponent, Scene, ScriptComponent, TextComponent, TransformComponent,
};
use hearth_core::time::FixedTimestep;
use hearth_physics::PhysicsWorld;
use hearth_script::{SceneBinding, ScriptContext, ScriptEngine, ScriptRuntime};
use hearth_services::{KeyCode, KeyboardState, Settings, TracingLogSink};
use tracing_subscriber::EnvFilter;

const SANDBOX_SCRIPT: &str = include_str!("../scripts/sandbox.js");

const DEMO_TICKS: u64 = 120;

fn main() -> Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(&path)
            .with_context(|| format!("loading settings from {path}"))?,
        None => Settings::default(),
    };

    // RUST_LOG wins over the settings file
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Hearth Engine v{}", hearth_core::VERSION);

    let mut scene = demo_scene()?;
    let [gx, gy] = settings.physics.gravity;
    let mut physics = PhysicsWorld::new(Vec2::new(gx, gy));
    scene.on_physics_start(&mut physics);
    tracing::info!(bodies = physics.body_count(), "physics started");

    let scene = Rc::new(RefCell::new(scene));
    let physics = Rc::new(RefCell::new(physics));
    let keyboard = Rc::new(RefCell::new(KeyboardState::new()));

    let context = ScriptContext::new(keyboard.clone(), Rc::new(TracingLogSink));
    let runtime = ScriptRuntime::new(ScriptEngine::new(settings.script.clone(), context))?;
    let bound = runtime.register_functions()?;
    let report = runtime.register_components()?;
    tracing::info!(
        calls = bound,
        components = report.registered.len(),
        missing = report.missing.len(),
        "script bridge ready"
    );

    runtime.execute(SANDBOX_SCRIPT)?;
    runtime.on_runtime_start(SceneBinding::new(scene.clone(), physics.clone()))?;
    let created = runtime.instantiate_entities()?;
    tracing::info!(instances = created, "scripts instantiated");

    // No window, so drive the player with a scripted key press.
    keyboard.borrow_mut().press(KeyCode::D);
    let mut timestep = FixedTimestep::new(settings.physics.fixed_timestep);
    while timestep.tick_count() < DEMO_TICKS {
        let steps = timestep.advance(timestep.step());
        for _ in 0..steps {
            runtime.update_entities(timestep.step())?;
            physics.borrow_mut().step(timestep.step());
            scene.borrow_mut().sync_physics(&physics.borrow());
        }
        if timestep.tick_count() >= DEMO_TICKS / 2 {
            keyboard.borrow_mut().release(KeyCode::D);
        }
    }

    {
        let scene = scene.borrow();
        for entity in scene.iter() {
            if let Some(transform) = entity.get::<TransformComponent>() {
                tracing::info!(
                    entity = %entity.id(),
                    name = entity.name(),
                    x = transform.translation.x,
                    y = transform.translation.y,
                    "final position"
                );
            }
            if let Some(text) = entity.get::<TextComponent>() {
                tracing::info!(entity = %entity.id(), text = %text.text, "label");
            }
        }
    }

    runtime.on_runtime_stop()?;
    scene.borrow_mut().on_physics_stop(&mut physics.borrow_mut());
    tracing::info!(ticks = timestep.tick_count(), "runtime stopped");

    Ok(())
}

fn demo_scene() -> Result<Scene> {
    let mut scene = Scene::new();

    let player = scene.spawn("Player");
    scene.add_component(
        player,
        Rigidbody2DComponent {
            fixed_rotation: true,
            ..Rigidbody2DComponent::new(BodyType::Dynamic)
        },
    )?;
    scene.add_component(player, BoxCollider2DComponent::default())?;
    scene.add_component(player, CircleRendererComponent::default())?;
    scene.add_component(
        player,
        ScriptComponent {
            class_name: "Sandbox.Player".into(),
        },
    )?;

    let ground = scene.spawn("Ground");
    scene.add_component(
        ground,
        TransformComponent::from_translation(Vec3::new(0.0, -2.0, 0.0)),
    )?;
    scene.add_component(ground, Rigidbody2DComponent::new(BodyType::Static))?;
    scene.add_component(ground, BoxCollider2DComponent::default())?;

    let camera = scene.spawn("Camera");
    scene.add_component(
        camera,
        TransformComponent::from_translation(Vec3::new(0.0, 0.0, 10.0)),
    )?;
    scene.add_component(camera, CameraComponent::default())?;
    scene.add_component(
        camera,
        ScriptComponent {
            class_name: "Sandbox.CameraController".into(),
        },
    )?;

    let label = scene.spawn("Label");
    scene.add_component(label, TextComponent::default())?;

    Ok(scene)
}
