//! Turn and combat state machine for one tracked character.
//!
//! Two orthogonal pieces of state:
//! - Combat lifecycle: Idle → InCombat (first class-relevant cast, or any cast
//!   once a special combat was flagged) → Idle on combat end
//! - Turn ownership: whoever cast last owns the turn; a turn-passed marker
//!   ends the turn of that most recent caster
//!
//! Any combat end resets the whole state to its initial value.

use crate::combat_log::CombatEvent;

use super::GameSignal;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedTurnState {
    pub in_combat: bool,
    /// First caster of a class spell this combat
    pub tracked_player: Option<String>,
    pub is_tracked_turn: bool,
    pub overlay_visible: bool,
    pub last_caster: Option<String>,
    pub special_combat_flag: bool,
}

impl TrackedTurnState {
    pub fn is_tracked(&self, name: &str) -> bool {
        self.tracked_player.as_deref() == Some(name)
    }
}

#[derive(Debug, Default)]
pub struct TurnStateMachine {
    state: TrackedTurnState,
}

impl TurnStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TrackedTurnState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = TrackedTurnState::default();
    }

    /// Whether `event` closes the current fight, checked before applying it.
    ///
    /// True for every end marker, including a repeated one that emits no
    /// signal, so per-combat state can always be cleared.
    pub fn ends_combat(&self, event: &CombatEvent) -> bool {
        match event {
            CombatEvent::CombatEnded { .. } => true,
            CombatEvent::Knockout { .. } => self.state.special_combat_flag,
            _ => false,
        }
    }

    /// Advance on one event.
    ///
    /// `locked` is the overlay lock, read fresh for every event.
    /// `is_class_spell` decides which casts can assign the tracked player.
    pub fn apply(
        &mut self,
        event: &CombatEvent,
        locked: bool,
        is_class_spell: impl Fn(&str) -> bool,
    ) -> Vec<GameSignal> {
        match event {
            CombatEvent::SpellCast { caster, spell } => {
                self.handle_cast(caster, is_class_spell(spell))
            }
            CombatEvent::TurnPassed => self.handle_turn_passed(locked),
            CombatEvent::CombatEnded { fight_id } => self.end_combat(*fight_id),
            CombatEvent::SpecialCombatStart => {
                if self.state.special_combat_flag {
                    return Vec::new();
                }
                self.state.special_combat_flag = true;
                tracing::debug!("Special combat flagged");
                vec![GameSignal::SpecialCombatFlagged]
            }
            CombatEvent::Knockout { target } if self.state.special_combat_flag => {
                tracing::debug!(target = %target, "Knockout ends special combat");
                self.end_combat(None)
            }
            _ => Vec::new(),
        }
    }

    fn handle_cast(&mut self, caster: &str, relevant: bool) -> Vec<GameSignal> {
        let mut signals = Vec::new();
        let state = &mut self.state;
        state.last_caster = Some(caster.to_string());

        if !state.in_combat && (relevant || state.special_combat_flag) {
            state.in_combat = true;
            tracing::info!(caster, "Combat started");
            signals.push(GameSignal::CombatStarted);
        }

        if !relevant {
            return signals;
        }

        if state.tracked_player.is_none() {
            state.tracked_player = Some(caster.to_string());
            tracing::info!(player = caster, "Tracked player assigned");
            signals.push(GameSignal::TrackedPlayerAssigned {
                player: caster.to_string(),
            });
        }

        if state.is_tracked(caster) {
            if !state.is_tracked_turn {
                tracing::debug!(player = caster, "Tracked turn started");
                signals.push(GameSignal::TrackedTurnStarted {
                    player: caster.to_string(),
                });
            }
            state.is_tracked_turn = true;
            state.overlay_visible = true;
        }

        signals
    }

    fn handle_turn_passed(&mut self, locked: bool) -> Vec<GameSignal> {
        let state = &mut self.state;

        // No caster seen yet: assume it was the tracked player's turn
        let tracked_turn_ended = match state.last_caster.as_deref() {
            Some(owner) => state.is_tracked(owner),
            None => state.tracked_player.is_some(),
        };
        if !tracked_turn_ended {
            return Vec::new();
        }

        state.is_tracked_turn = false;
        if !locked {
            state.overlay_visible = false;
        }
        tracing::debug!(player = ?state.tracked_player, locked, "Tracked turn ended");
        vec![GameSignal::TrackedTurnEnded {
            player: state.tracked_player.clone(),
            overlay_kept: locked,
        }]
    }

    fn end_combat(&mut self, fight_id: Option<u64>) -> Vec<GameSignal> {
        let was_active = self.state.in_combat || self.state.tracked_player.is_some();
        self.reset();
        if !was_active {
            return Vec::new();
        }
        tracing::info!(?fight_id, "Combat ended");
        vec![GameSignal::CombatEnded { fight_id }]
    }
}
