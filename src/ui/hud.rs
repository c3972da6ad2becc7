use bevy::prelude::*;

use crate::encounter::TrainerTarget;
use crate::shared::*;
use crate::world::WorldState;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

/// Marker for the map name text node at top-left.
#[derive(Component)]
pub struct HudMapName;

/// Marker for the "press E" / "press SPACE" prompt.
#[derive(Component, Debug)]
pub struct HudInteractionPrompt;

// ═══════════════════════════════════════════════════════════════════════
// PROMPT TEXT
// ═══════════════════════════════════════════════════════════════════════

/// What the player can do right now, if anything. Trainers take priority
/// over bushes.
pub fn interaction_prompt(world: &WorldState, target: &TrainerTarget) -> Option<&'static str> {
    if target.in_range() {
        return Some("A trainer wants to battle! Press SPACE.");
    }
    if target.index.is_some() {
        return Some("A trainer has spotted you...");
    }
    if world.bushes.iter().any(|b| b.detected) {
        return Some("Something rustles in the grass. Press E to search.");
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN / DESPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                padding: UiRect::all(Val::Px(12.0)),
                ..default()
            },
            PickingBehavior::IGNORE,
        ))
        .with_children(|root| {
            root.spawn((
                HudMapName,
                Text::new(""),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                PickingBehavior::IGNORE,
            ));
            root.spawn((
                Node {
                    align_self: AlignSelf::Center,
                    padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                    ..default()
                },
                BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                Visibility::Hidden,
                HudInteractionPrompt,
                PickingBehavior::IGNORE,
            ))
            .with_children(|prompt| {
                prompt.spawn((
                    Text::new(""),
                    TextFont {
                        font_size: 16.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            });
        });
}

pub fn despawn_hud(mut commands: Commands, query: Query<Entity, With<HudRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE
// ═══════════════════════════════════════════════════════════════════════

pub fn update_map_name(world: Res<WorldState>, mut query: Query<&mut Text, With<HudMapName>>) {
    let name = world.current_map().name().to_uppercase();
    for mut text in &mut query {
        if text.0 != name {
            text.0 = name.clone();
        }
    }
}

pub fn update_interaction_prompt(
    world: Res<WorldState>,
    target: Res<TrainerTarget>,
    mut prompts: Query<(&mut Visibility, &Children), With<HudInteractionPrompt>>,
    mut texts: Query<&mut Text>,
) {
    let prompt = interaction_prompt(&world, &target);
    for (mut visibility, children) in &mut prompts {
        *visibility = if prompt.is_some() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        for &child in children.iter() {
            if let Ok(mut text) = texts.get_mut(child) {
                text.0 = prompt.unwrap_or_default().to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_priority() {
        let mut world = WorldState::new(MapId::Route);
        let mut target = TrainerTarget::default();
        assert_eq!(interaction_prompt(&world, &target), None);

        world.bushes[0].detected = true;
        assert!(interaction_prompt(&world, &target).unwrap().contains("Press E"));

        target.index = Some(0);
        target.distance = TILE_SIZE * 4.0;
        assert!(interaction_prompt(&world, &target).unwrap().contains("spotted"));

        target.distance = TILE_SIZE;
        assert!(interaction_prompt(&world, &target).unwrap().contains("SPACE"));
    }
}
