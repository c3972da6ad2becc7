//! Scene transitions: the single-slot request queue, the battle handoff and
//! the session record that survives scene changes.
//!
//! Gameplay code never sets `NextState<GameState>` directly. It queues a
//! `SceneRequest`; `apply_scene_queue` runs in `Last`, so the state change
//! happens on the next frame, after every system of this frame has seen the
//! old scene.

use bevy::prelude::*;

use crate::save::{LoadCompleteEvent, SaveReason, SaveRequestEvent};
use crate::shared::*;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameSession>()
            .init_resource::<SceneQueue>()
            .init_resource::<BattleHandoff>()
            .add_systems(Last, apply_scene_queue)
            .add_systems(OnEnter(GameState::Overworld), enter_overworld)
            .add_systems(
                Update,
                apply_loaded_result
                    .after(crate::save::handle_load_request)
                    .run_if(in_state(GameState::Overworld)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// BATTLE ENTRY
// ═══════════════════════════════════════════════════════════════════════

/// Everything a battle needs, validated at the moment it is queued.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleEntry {
    /// Copy of the player's monster. Stands in when there is no roster slot.
    pub player: Monster,
    /// Roster index of the player's monster; the battle damages it in place.
    pub player_slot: Option<usize>,
    pub enemy: Monster,
    pub is_wild: bool,
    pub source: EncounterSource,
}

impl BattleEntry {
    /// Missing monsters are replaced with the placeholder pair.
    pub fn new(
        player: Option<(usize, Monster)>,
        enemy: Option<Monster>,
        is_wild: bool,
        source: EncounterSource,
    ) -> Self {
        let (player_slot, player) = match player {
            Some((slot, monster)) => (Some(slot), monster),
            None => {
                warn!("No player monster for battle, using a placeholder.");
                (None, Monster::placeholder_player())
            }
        };
        let enemy = enemy.unwrap_or_else(|| {
            warn!("No enemy monster for battle, using a placeholder.");
            Monster::placeholder_enemy()
        });
        Self {
            player,
            player_slot,
            enemy,
            is_wild,
            source,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// QUEUE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum SceneRequest {
    Overworld,
    Battle(BattleEntry),
}

impl SceneRequest {
    pub fn target(&self) -> GameState {
        match self {
            SceneRequest::Overworld => GameState::Overworld,
            SceneRequest::Battle(_) => GameState::Battle,
        }
    }
}

/// At most one scene change may be pending.
#[derive(Resource, Debug, Default)]
pub struct SceneQueue {
    pending: Option<SceneRequest>,
}

impl SceneQueue {
    /// Returns false, leaving the earlier request in place, when one is
    /// already pending.
    pub fn request(&mut self, request: SceneRequest) -> bool {
        if let Some(pending) = &self.pending {
            warn!(
                "Scene change to {:?} ignored, {:?} already queued.",
                request.target(),
                pending.target()
            );
            return false;
        }
        self.pending = Some(request);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&SceneRequest> {
        self.pending.as_ref()
    }

    pub fn take(&mut self) -> Option<SceneRequest> {
        self.pending.take()
    }
}

/// The entry of the battle about to start. Consumed by the battle's
/// `OnEnter` hook.
#[derive(Resource, Debug, Default)]
pub struct BattleHandoff(pub Option<BattleEntry>);

// ═══════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════

/// State that outlives any one scene.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct GameSession {
    /// Set while a battle is queued or running. Blocks new encounters.
    pub current_battle: Option<EncounterSource>,
    /// Written when a battle ends, consumed once by the overworld.
    pub last_battle_result: Option<BattleResult>,
}

impl GameSession {
    pub fn in_battle(&self) -> bool {
        self.current_battle.is_some()
    }

    /// Claim the current-battle guard. False if a battle already holds it.
    pub fn begin_battle(&mut self, source: EncounterSource) -> bool {
        if let Some(current) = self.current_battle {
            warn!(
                "Encounter {:?} ignored, battle with {:?} already in progress.",
                source, current
            );
            return false;
        }
        self.current_battle = Some(source);
        true
    }

    pub fn end_battle(&mut self, result: Option<BattleResult>) {
        self.last_battle_result = result;
        self.current_battle = None;
    }

    /// Read-and-clear.
    pub fn take_battle_result(&mut self) -> Option<BattleResult> {
        self.last_battle_result.take()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn apply_scene_queue(
    mut queue: ResMut<SceneQueue>,
    mut handoff: ResMut<BattleHandoff>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(request) = queue.take() else {
        return;
    };
    let target = request.target();
    if let SceneRequest::Battle(entry) = request {
        handoff.0 = Some(entry);
    }
    info!("Scene change to {:?}.", target);
    next_state.set(target);
}

fn handle_win() {
    info!("Battle won.");
}

fn handle_lose() {
    info!("Battle lost.");
}

fn handle_run() {
    info!("Got away safely.");
}

/// Consume the pending result once and run its handler. Position and the
/// roster are left as they are. Returns the handled result.
pub fn apply_battle_result(
    session: &mut GameSession,
    saves: &mut EventWriter<SaveRequestEvent>,
) -> Option<BattleResult> {
    let result = session.take_battle_result()?;
    match result {
        BattleResult::Win => handle_win(),
        BattleResult::Lose => handle_lose(),
        BattleResult::Run => handle_run(),
    }
    saves.send(SaveRequestEvent {
        reason: SaveReason::Auto,
    });
    Some(result)
}

pub fn enter_overworld(
    mut session: ResMut<GameSession>,
    mut saves: EventWriter<SaveRequestEvent>,
    mut music: EventWriter<PlayMusicEvent>,
) {
    apply_battle_result(&mut session, &mut saves);
    music.send(PlayMusicEvent {
        track_id: "overworld".to_string(),
    });
}

/// A loaded save may carry a result that was never applied.
pub fn apply_loaded_result(
    mut loads: EventReader<LoadCompleteEvent>,
    mut session: ResMut<GameSession>,
    mut saves: EventWriter<SaveRequestEvent>,
) {
    let loaded = loads.read().fold(false, |acc, ev| acc || ev.success);
    if loaded {
        apply_battle_result(&mut session, &mut saves);
    }
}
