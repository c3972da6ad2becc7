use bevy::prelude::*;
use crate::shared::*;

/// Alpha per second for stepping through a teleport.
const TELEPORT_FADE_SPEED: f32 = 4.0;
/// Alpha per second for entering or leaving a battle.
const SCENE_FADE_SPEED: f32 = 6.0;

#[derive(Component)]
pub struct FadeCurtain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadePhase {
    #[default]
    Idle,
    Darken,
    Lighten,
}

/// A dip to black and back, drawn by the full-screen curtain node.
#[derive(Resource, Debug, Default)]
pub struct ScreenFade {
    pub phase: FadePhase,
    /// 0.0 clear, 1.0 black.
    pub alpha: f32,
    pub speed: f32,
}

impl ScreenFade {
    pub fn start(&mut self, speed: f32) {
        self.phase = FadePhase::Darken;
        self.speed = speed;
    }

    pub fn is_running(&self) -> bool {
        self.phase != FadePhase::Idle
    }

    pub fn advance(&mut self, dt: f32) {
        let step = self.speed * dt;
        match self.phase {
            FadePhase::Idle => {}
            FadePhase::Darken => {
                self.alpha = (self.alpha + step).min(1.0);
                if self.alpha >= 1.0 {
                    self.phase = FadePhase::Lighten;
                }
            }
            FadePhase::Lighten => {
                self.alpha = (self.alpha - step).max(0.0);
                if self.alpha <= 0.0 {
                    self.phase = FadePhase::Idle;
                }
            }
        }
    }
}

pub fn spawn_fade_overlay(mut commands: Commands) {
    commands.spawn((
        FadeCurtain,
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        BackgroundColor(Color::NONE),
        GlobalZIndex(100),
        PickingBehavior::IGNORE,
    ));
}

pub fn trigger_fade_on_transition(
    mut transitions: EventReader<MapTransitionEvent>,
    mut fade: ResMut<ScreenFade>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if transitions.read().count() == 0 {
        return;
    }
    fade.start(TELEPORT_FADE_SPEED);
    sfx.send(PlaySfxEvent {
        sfx_id: "door".to_string(),
    });
}

pub fn fade_on_scene_change(mut fade: ResMut<ScreenFade>) {
    fade.start(SCENE_FADE_SPEED);
}

pub fn update_fade(
    time: Res<Time>,
    mut fade: ResMut<ScreenFade>,
    mut curtains: Query<&mut BackgroundColor, With<FadeCurtain>>,
) {
    if !fade.is_running() {
        return;
    }
    fade.advance(time.delta_secs());

    let color = Color::BLACK.with_alpha(fade.alpha);
    for mut background in &mut curtains {
        background.0 = color;
    }
}
