use bevy::prelude::*;

use linefollower::config::SimConfig;
use linefollower::simulation::SimulationState;
use linefollower::steering::SteeringController;
use linefollower::track::Track;

use crate::{SimState, TrackSource};

pub struct StatusUiPlugin;

impl Plugin for StatusUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_ui)
            .add_systems(Update, (update_status_text, toggle_help));
    }
}

#[derive(Component)]
struct StatusText;

#[derive(Component)]
struct HelpOverlay;

const TEXT_COLOR: Color = Color::srgb(0.1, 0.1, 0.1);
const PANEL_BG: Color = Color::srgba(1.0, 1.0, 1.0, 0.8);

const HELP_TEXT: &str = "\
Controls:
  LMB      Append point at cursor
  E        Print track points
  Space    Pause / resume
  R        Reset car
  H        Toggle this help
  Esc      Quit";

fn px(val: f32) -> Val {
    Val::Px(val)
}

fn setup_ui(mut commands: Commands) {
    // Status (top-left)
    commands.spawn((
        Text::new("--"),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(TEXT_COLOR),
        Node {
            position_type: PositionType::Absolute,
            top: px(8.0),
            left: px(8.0),
            padding: UiRect::axes(px(8.0), px(4.0)),
            ..default()
        },
        BackgroundColor(PANEL_BG),
        StatusText,
    ));

    // Help (bottom-left)
    commands.spawn((
        Text::new(HELP_TEXT),
        TextFont {
            font_size: 13.0,
            ..default()
        },
        TextColor(TEXT_COLOR),
        Node {
            position_type: PositionType::Absolute,
            bottom: px(8.0),
            left: px(8.0),
            padding: UiRect::axes(px(8.0), px(4.0)),
            ..default()
        },
        BackgroundColor(PANEL_BG),
        HelpOverlay,
    ));
}

fn update_status_text(
    state: Res<SimulationState>,
    config: Res<SimConfig>,
    track: Res<Track>,
    source: Res<TrackSource>,
    sim_state: Res<State<SimState>>,
    mut text_q: Query<&mut Text, With<StatusText>>,
) {
    let Ok(mut text) = text_q.single_mut() else {
        return;
    };

    let paused = if *sim_state.get() == SimState::Paused {
        "  |  PAUSED"
    } else {
        ""
    };
    let contact = |on: bool| if on { "on" } else { "off" };
    let accumulator = state
        .steering
        .time_off_line()
        .map(|t| format!("  |  Time off line: {t:.2}"))
        .unwrap_or_default();

    **text = format!(
        "{}  |  {} points{paused}\n\
         Tick {}  |  Heading {:.1}°  |  Speed {:.1}\n\
         Left {}  |  Right {}  |  Steering: {}{accumulator}",
        source.0,
        track.len(),
        state.tick,
        state.pose.heading,
        config.car.speed,
        contact(state.readings.left),
        contact(state.readings.right),
        state.steering.name(),
    );
}

fn toggle_help(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut help_q: Query<&mut Visibility, With<HelpOverlay>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyH) {
        return;
    }
    for mut visibility in &mut help_q {
        *visibility = match *visibility {
            Visibility::Hidden => Visibility::Inherited,
            _ => Visibility::Hidden,
        };
    }
}
