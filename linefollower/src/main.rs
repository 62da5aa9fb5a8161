use std::path::{Path, PathBuf};

use bevy::{
    prelude::*,
    window::{PrimaryWindow, WindowResolution},
};
use clap::Parser;

use linefollower::config::SimConfig;
use linefollower::input::{FrameInput, TrackEditor};
use linefollower::simulation::{self, SimulationState};
use linefollower::track::{self, Track};
use linefollower::track_format::TrackFile;

mod ui;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Track file (TOML) to follow instead of the built-in course.
    #[arg(long)]
    track: Option<PathBuf>,

    /// Simulation config (TOML). Missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run this many ticks without a window, then log a summary.
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,
}

// ── Simulation state ────────────────────────────────────────────────

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SimState {
    #[default]
    Running,
    Paused,
}

/// Where the track came from, for the startup log and the status overlay.
#[derive(Resource, Clone, Debug)]
pub struct TrackSource(pub String);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.headless.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "linefollower=info".into()),
            )
            .init();
    }

    let config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let (track, source) = load_track(cli.track.as_deref(), &config)?;

    if let Some(ticks) = cli.headless {
        run_headless(&config, &track, &source, ticks);
        return Ok(());
    }

    let tick = config.window.tick_duration()?;
    let exit = App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: config.window.title.clone(),
                    resolution: WindowResolution::from((config.window.width, config.window.height)),
                    resizable: true,
                    ..default()
                }),
                ..default()
            }),
            ui::StatusUiPlugin,
        ))
        .init_state::<SimState>()
        .insert_resource(ClearColor(Color::WHITE))
        .insert_resource(Time::<Fixed>::from_duration(tick))
        .insert_resource(SimulationState::new(&config))
        .insert_resource(config)
        .insert_resource(track)
        .insert_resource(source)
        .init_resource::<TrackEditor>()
        .add_systems(Startup, (setup, log_startup))
        .add_systems(
            FixedUpdate,
            tick_simulation.run_if(in_state(SimState::Running)),
        )
        .add_systems(
            Update,
            (
                fit_camera_to_window,
                handle_track_editing,
                handle_keyboard,
                rebuild_track_mesh.run_if(resource_changed::<Track>),
                sync_car_visuals,
                update_preview_segment,
            ),
        )
        .run();

    match exit {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(format!("simulation exited with status {code}").into()),
    }
}

fn load_track(
    path: Option<&Path>,
    config: &SimConfig,
) -> Result<(Track, TrackSource), Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let file = TrackFile::load(path)?;
            let track = file.to_track()?;
            let source = format!("{} ({})", file.metadata.name, path.display());
            Ok((track, TrackSource(source)))
        }
        None => {
            let mut track = Track::default();
            if config.track.line_width != track.line_width() {
                track = Track::new(track.points().to_vec(), config.track.line_width);
            }
            Ok((track, TrackSource("built-in course".to_string())))
        }
    }
}

fn run_headless(config: &SimConfig, track: &Track, source: &TrackSource, ticks: u64) {
    info!(
        track = %source.0,
        points = track.len(),
        steering = ?config.steering.kind,
        "running headless for {ticks} ticks"
    );
    let (state, summary) = simulation::run(SimulationState::new(config), track, config, ticks);
    info!(
        ticks = summary.ticks,
        ticks_on_line = summary.ticks_on_line,
        sensor_refreshes = summary.sensor_refreshes,
        x = state.pose.position.x,
        y = state.pose.position.y,
        heading = state.pose.heading,
        "headless run finished"
    );
}

// ── Rendering ───────────────────────────────────────────────────────

/// Track coordinates have y pointing down; the world has y pointing up.
fn to_world(point: Vec2) -> Vec2 {
    Vec2::new(point.x, -point.y)
}

const TRACK_COLOR: Color = Color::BLACK;
const CAR_COLOR: Color = Color::srgb(1.0, 1.0, 0.0);
const ON_LINE_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);
const OFF_LINE_COLOR: Color = Color::srgb(0.0, 0.5, 0.0);
/// Extra radius of the ring shown around the sensors on refresh ticks.
const REFRESH_HALO: f32 = 6.0;

#[derive(Component)]
struct TrackVisual;

#[derive(Component)]
struct CarBody;

/// Where a click would extend the track, drawn at the track's width.
#[derive(Component)]
struct PreviewSegment;

#[derive(Component, Clone, Copy, PartialEq, Eq)]
enum SensorSide {
    Left,
    Right,
}

#[derive(Component)]
struct SensorDisc(SensorSide);

#[derive(Component)]
struct RefreshHalo(SensorSide);

#[derive(Resource)]
struct SensorMaterials {
    on_line: Handle<ColorMaterial>,
    off_line: Handle<ColorMaterial>,
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    config: Res<SimConfig>,
) {
    commands.spawn(Camera2d);

    commands.spawn((
        Mesh2d(meshes.add(track::create_segment_mesh(
            Vec2::ZERO,
            Vec2::ZERO,
            0.0,
            to_world,
        ))),
        MeshMaterial2d(materials.add(TRACK_COLOR)),
        Transform::from_xyz(0.0, 0.0, 0.5),
        Visibility::Hidden,
        PreviewSegment,
    ));

    commands.spawn((
        Mesh2d(meshes.add(Rectangle::new(config.car.width, config.car.height))),
        MeshMaterial2d(materials.add(CAR_COLOR)),
        Transform::from_xyz(0.0, 0.0, 1.0),
        CarBody,
    ));

    let sensor_materials = SensorMaterials {
        on_line: materials.add(ON_LINE_COLOR),
        off_line: materials.add(OFF_LINE_COLOR),
    };
    let halo_mesh = meshes.add(Circle::new(config.sensors.radius + REFRESH_HALO));
    let halo_material = materials.add(Color::BLACK);
    let disc_mesh = meshes.add(Circle::new(config.sensors.radius));

    for side in [SensorSide::Left, SensorSide::Right] {
        commands.spawn((
            Mesh2d(halo_mesh.clone()),
            MeshMaterial2d(halo_material.clone()),
            Transform::from_xyz(0.0, 0.0, 2.0),
            Visibility::Hidden,
            RefreshHalo(side),
        ));
        commands.spawn((
            Mesh2d(disc_mesh.clone()),
            MeshMaterial2d(sensor_materials.off_line.clone()),
            Transform::from_xyz(0.0, 0.0, 3.0),
            SensorDisc(side),
        ));
    }

    commands.insert_resource(sensor_materials);
}

fn log_startup(config: Res<SimConfig>, track: Res<Track>, source: Res<TrackSource>) {
    info!(
        track = %source.0,
        points = track.len(),
        line_width = track.line_width(),
        steering = ?config.steering.kind,
        "simulation ready"
    );
}

/// Keep world (0, 0) at the top-left corner of the window.
fn fit_camera_to_window(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut camera_q: Query<&mut Transform, With<Camera2d>>,
) {
    let Ok(window) = windows.single() else { return };
    let Ok(mut cam_tf) = camera_q.single_mut() else { return };
    cam_tf.translation.x = window.width() / 2.0;
    cam_tf.translation.y = -window.height() / 2.0;
}

fn rebuild_track_mesh(
    mut commands: Commands,
    old_track: Query<Entity, With<TrackVisual>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    track: Res<Track>,
) {
    for entity in &old_track {
        commands.entity(entity).despawn();
    }

    commands.spawn((
        Mesh2d(meshes.add(track::create_track_mesh(&track, to_world))),
        MeshMaterial2d(materials.add(TRACK_COLOR)),
        Transform::from_xyz(0.0, 0.0, 0.0),
        TrackVisual,
    ));
}

fn sync_car_visuals(
    state: Res<SimulationState>,
    config: Res<SimConfig>,
    sensor_materials: Res<SensorMaterials>,
    mut body_q: Query<&mut Transform, With<CarBody>>,
    mut disc_q: Query<
        (&SensorDisc, &mut Transform, &mut MeshMaterial2d<ColorMaterial>),
        Without<CarBody>,
    >,
    mut halo_q: Query<
        (&RefreshHalo, &mut Transform, &mut Visibility),
        (Without<CarBody>, Without<SensorDisc>),
    >,
) {
    if let Ok(mut body_tf) = body_q.single_mut() {
        let center = to_world(state.pose.position);
        body_tf.translation.x = center.x;
        body_tf.translation.y = center.y;
        // Clockwise on screen is a negative rotation once y points up.
        body_tf.rotation = Quat::from_rotation_z(-state.pose.heading.to_radians());
    }

    let sensors = state.sensors(&config);
    let position_of = |side: SensorSide| match side {
        SensorSide::Left => to_world(sensors.left),
        SensorSide::Right => to_world(sensors.right),
    };
    let on_line = |side: SensorSide| match side {
        SensorSide::Left => state.readings.left,
        SensorSide::Right => state.readings.right,
    };

    for (disc, mut transform, mut material) in &mut disc_q {
        let p = position_of(disc.0);
        transform.translation.x = p.x;
        transform.translation.y = p.y;
        let wanted = if on_line(disc.0) {
            &sensor_materials.on_line
        } else {
            &sensor_materials.off_line
        };
        if material.0 != *wanted {
            material.0 = wanted.clone();
        }
    }

    for (halo, mut transform, mut visibility) in &mut halo_q {
        let p = position_of(halo.0);
        transform.translation.x = p.x;
        transform.translation.y = p.y;
        *visibility = if state.sensors_refreshed {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

fn update_preview_segment(
    windows: Query<&Window, With<PrimaryWindow>>,
    track: Res<Track>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut preview_q: Query<(&Mesh2d, &mut Visibility), With<PreviewSegment>>,
) {
    let Ok((mesh2d, mut visibility)) = preview_q.single_mut() else {
        return;
    };
    let cursor = windows.single().ok().and_then(|window| window.cursor_position());
    let (Some(last), Some(cursor)) = (track.last(), cursor) else {
        *visibility = Visibility::Hidden;
        return;
    };

    if let Some(mut mesh) = meshes.get_mut(&mesh2d.0) {
        *mesh = track::create_segment_mesh(last, cursor, track.line_width(), to_world);
    }
    *visibility = Visibility::Inherited;
}

// ── Simulation & input ──────────────────────────────────────────────

fn tick_simulation(
    mut state: ResMut<SimulationState>,
    track: Res<Track>,
    config: Res<SimConfig>,
) {
    let next = simulation::advance(state.clone(), &track, &config);
    *state = next;
}

fn handle_track_editing(
    windows: Query<&Window, With<PrimaryWindow>>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut editor: ResMut<TrackEditor>,
    mut track: ResMut<Track>,
) {
    let Ok(window) = windows.single() else { return };
    let input = FrameInput {
        // Window coordinates already have their origin top-left with y down.
        pointer: window.cursor_position(),
        add_point_held: buttons.pressed(MouseButton::Left),
    };

    // Only flag the track as changed when a point was actually added.
    if let Some(point) = editor.apply(&input, track.bypass_change_detection()) {
        track.set_changed();
        info!("Added track point ({}, {}), {} points", point.x, point.y, track.len());
    }
}

fn handle_keyboard(
    keyboard: Res<ButtonInput<KeyCode>>,
    sim_state: Res<State<SimState>>,
    mut next_sim_state: ResMut<NextState<SimState>>,
    mut state: ResMut<SimulationState>,
    config: Res<SimConfig>,
    track: Res<Track>,
    mut exit: MessageWriter<AppExit>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
        return;
    }

    // --- Export (E) ---
    if keyboard.just_pressed(KeyCode::KeyE) {
        print!("{}", track.export_lines());
        info!("Exported {} track points", track.len());
    }

    // --- Pause / resume (Space) ---
    if keyboard.just_pressed(KeyCode::Space) {
        match sim_state.get() {
            SimState::Running => {
                next_sim_state.set(SimState::Paused);
                info!("Paused at tick {}", state.tick);
            }
            SimState::Paused => {
                next_sim_state.set(SimState::Running);
                info!("Resumed");
            }
        }
    }

    // --- Reset car (R) ---
    if keyboard.just_pressed(KeyCode::KeyR) {
        *state = SimulationState::new(&config);
        info!("Car reset to its start pose");
    }
}
