//! Battle screen: both monsters, their hp, the turn indicator and the
//! action hints. Rebuilt from `ActiveBattle` every frame.

use bevy::prelude::*;

use crate::bag::Bag;
use crate::battle::state::Battle;
use crate::battle::ActiveBattle;
use crate::shared::*;

const PLAYER_MONSTER_COLOR: Color = Color::srgb(0.95, 0.8, 0.2);
const ENEMY_MONSTER_COLOR: Color = Color::srgb(0.55, 0.3, 0.7);
const BATTLE_BACKDROP: Color = Color::srgb(0.85, 0.9, 0.8);

#[derive(Component)]
pub struct BattleHudRoot;

/// World-space sprites of the battle scene.
#[derive(Component)]
pub struct BattleSprite;

#[derive(Component)]
pub struct BattleTurnText;

#[derive(Component)]
pub struct PlayerHpText;

#[derive(Component)]
pub struct EnemyHpText;

#[derive(Component)]
pub struct BattleHintText;

pub fn hp_line(monster: &Monster) -> String {
    format!(
        "{} Lv.{}  HP {}/{}",
        monster.name, monster.level, monster.hp, monster.max_hp
    )
}

pub fn hint_line(battle: &Battle, balls: u32) -> String {
    if battle.is_over() {
        "Press SPACE to exit.".to_string()
    } else if battle.is_wild {
        format!("[1] Attack   [2] Run   [3] Catch ({} left)", balls)
    } else {
        "[1] Attack   [2] Run".to_string()
    }
}

fn hud_text(text: impl Into<String>, size: f32) -> (Text, TextFont, TextColor) {
    (
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(Color::WHITE),
    )
}

pub fn spawn_battle_hud(mut commands: Commands, camera: Query<&Transform, With<Camera2d>>) {
    // Battle sprites are laid out around wherever the camera is.
    let center = camera
        .get_single()
        .map(|t| t.translation.truncate())
        .unwrap_or(Vec2::ZERO);

    commands.spawn((
        BattleSprite,
        Sprite::from_color(BATTLE_BACKDROP, Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT)),
        Transform::from_translation(center.extend(20.0)),
    ));
    commands.spawn((
        BattleSprite,
        Sprite::from_color(PLAYER_MONSTER_COLOR, Vec2::splat(TILE_SIZE * 3.0)),
        Transform::from_translation((center + Vec2::new(-200.0, -60.0)).extend(21.0)),
    ));
    commands.spawn((
        BattleSprite,
        Sprite::from_color(ENEMY_MONSTER_COLOR, Vec2::splat(TILE_SIZE * 3.0)),
        Transform::from_translation((center + Vec2::new(200.0, 80.0)).extend(21.0)),
    ));

    commands
        .spawn((
            BattleHudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                padding: UiRect::all(Val::Px(16.0)),
                ..default()
            },
            PickingBehavior::IGNORE,
        ))
        .with_children(|root| {
            root.spawn((EnemyHpText, hud_text("", 20.0)));
            root.spawn((BattleTurnText, hud_text("", 24.0)));
            root.spawn((
                Node {
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(6.0),
                    padding: UiRect::all(Val::Px(8.0)),
                    ..default()
                },
                BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            ))
            .with_children(|panel| {
                panel.spawn((PlayerHpText, hud_text("", 20.0)));
                panel.spawn((BattleHintText, hud_text("", 16.0)));
            });
        });
}

pub fn despawn_battle_hud(
    mut commands: Commands,
    roots: Query<Entity, Or<(With<BattleHudRoot>, With<BattleSprite>)>>,
) {
    for entity in &roots {
        commands.entity(entity).despawn_recursive();
    }
}

#[allow(clippy::type_complexity)]
pub fn update_battle_hud(
    active: Option<Res<ActiveBattle>>,
    bag: Res<Bag>,
    mut texts: ParamSet<(
        Query<&mut Text, With<BattleTurnText>>,
        Query<&mut Text, With<PlayerHpText>>,
        Query<&mut Text, With<EnemyHpText>>,
        Query<&mut Text, With<BattleHintText>>,
    )>,
) {
    let Some(active) = active else {
        return;
    };
    let battle = &active.0;
    let balls = bag.get_item(CATCH_ITEM).map_or(0, |i| i.count);

    for mut text in texts.p0().iter_mut() {
        text.0 = battle.turn_label();
    }
    for mut text in texts.p1().iter_mut() {
        text.0 = hp_line(battle.player(&bag));
    }
    for mut text in texts.p2().iter_mut() {
        text.0 = hp_line(&battle.enemy);
    }
    for mut text in texts.p3().iter_mut() {
        text.0 = hint_line(battle, balls);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::BattleEntry;

    #[test]
    fn test_hp_line() {
        let monster = Monster::placeholder_enemy();
        assert_eq!(hp_line(&monster), "Gengar_fake Lv.30  HP 80/80");
    }

    #[test]
    fn test_hint_line_per_phase() {
        let mut battle = Battle::new(BattleEntry::new(None, None, true, EncounterSource::Unknown));
        assert!(hint_line(&battle, 4).contains("Catch (4 left)"));
        battle.is_wild = false;
        assert!(!hint_line(&battle, 4).contains("Catch"));
        battle.run();
        assert_eq!(hint_line(&battle, 4), "Press SPACE to exit.");
    }
}
