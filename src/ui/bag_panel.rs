//! Bag overlay: the roster and the item counts, opened with B in the
//! overworld.

use bevy::prelude::*;

use super::battle_hud::hp_line;
use crate::bag::Bag;
use crate::shared::*;

#[derive(Component)]
pub struct BagPanelRoot;

#[derive(Component)]
pub struct BagPanelText;

/// One line per roster entry and item stack, grouped under headings.
pub fn bag_panel_lines(bag: &Bag) -> Vec<String> {
    let mut lines = vec!["MONSTERS".to_string()];
    if bag.monsters.is_empty() {
        lines.push("  (none)".to_string());
    }
    for (slot, monster) in bag.monsters.iter().enumerate() {
        let fainted = if monster.is_fainted() { "  fainted" } else { "" };
        lines.push(format!("  {}. {}{}", slot + 1, hp_line(monster), fainted));
    }

    lines.push("ITEMS".to_string());
    if bag.items.is_empty() {
        lines.push("  (none)".to_string());
    }
    for item in &bag.items {
        lines.push(format!("  {} x{}", item.name, item.count));
    }
    lines
}

pub fn spawn_bag_panel(mut commands: Commands) {
    commands
        .spawn((
            BagPanelRoot,
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(16.0),
                top: Val::Px(48.0),
                min_width: Val::Px(280.0),
                padding: UiRect::all(Val::Px(12.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.05, 0.05, 0.1, 0.85)),
            Visibility::Hidden,
            PickingBehavior::IGNORE,
        ))
        .with_children(|panel| {
            panel.spawn((
                BagPanelText,
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

pub fn despawn_bag_panel(mut commands: Commands, query: Query<Entity, With<BagPanelRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

pub fn toggle_bag_panel(
    input: Res<PlayerInput>,
    mut panels: Query<&mut Visibility, With<BagPanelRoot>>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if !input.toggle_bag {
        return;
    }
    for mut visibility in &mut panels {
        *visibility = match *visibility {
            Visibility::Hidden => Visibility::Inherited,
            _ => Visibility::Hidden,
        };
    }
    sfx.send(PlaySfxEvent {
        sfx_id: "menu_select".to_string(),
    });
}

pub fn update_bag_panel(
    bag: Res<Bag>,
    panels: Query<&Visibility, With<BagPanelRoot>>,
    mut texts: Query<&mut Text, With<BagPanelText>>,
) {
    if panels.iter().all(|v| *v == Visibility::Hidden) {
        return;
    }
    let content = bag_panel_lines(&bag).join("\n");
    for mut text in &mut texts {
        if text.0 != content {
            text.0 = content.clone();
        }
    }
}
