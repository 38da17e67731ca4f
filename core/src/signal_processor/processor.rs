use waksense_types::{ClassKind, DedupStats, OverlaySnapshot};

use crate::combat_log::{CombatEvent, ParsedLine};
use crate::combo::ComboMatcher;
use crate::resources::{ResourceEngine, engine_for};
use crate::roster::Roster;
use crate::signal_processor::signal::GameSignal;
use crate::timeline::CastTimeline;

use super::combat_state::{TrackedTurnState, TurnStateMachine};

/// Processes parsed lines for one tracked character and emits signals.
///
/// Owns the turn machine, the class resource engine, the combo matcher, the
/// timeline and the fighter roster. All of it is single-threaded and fed in
/// strict log order.
pub struct EventProcessor {
    character: String,
    turn: TurnStateMachine,
    engine: Box<dyn ResourceEngine>,
    combos: ComboMatcher,
    timeline: CastTimeline,
    roster: Roster,
}

impl EventProcessor {
    pub fn new(character: impl Into<String>, class: ClassKind, timeline_capacity: usize) -> Self {
        let engine = engine_for(class);
        let combos = ComboMatcher::new(engine.combos());
        Self {
            character: character.into(),
            turn: TurnStateMachine::new(),
            engine,
            combos,
            timeline: CastTimeline::new(timeline_capacity),
            roster: Roster::new(),
        }
    }

    pub fn class(&self) -> ClassKind {
        self.engine.class()
    }

    pub fn turn_state(&self) -> &TrackedTurnState {
        self.turn.state()
    }

    pub fn engine(&self) -> &dyn ResourceEngine {
        self.engine.as_ref()
    }

    pub fn timeline(&self) -> &CastTimeline {
        &self.timeline
    }

    pub fn combos(&self) -> &ComboMatcher {
        &self.combos
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Process one parsed line.
    /// `locked` is the character's overlay lock at the time of the line.
    pub fn process_line(&mut self, line: &ParsedLine, locked: bool) -> Vec<GameSignal> {
        let mut signals = Vec::new();

        // ═══════════════════════════════════════════════════════════════════════
        // PHASE 1: Combat lifecycle and turn ownership
        // ═══════════════════════════════════════════════════════════════════════

        // A repeated end marker is silent but still clears per-combat state
        let mut combat_end = None;
        let engine = &self.engine;
        for event in &line.events {
            if self.turn.ends_combat(event) {
                combat_end = Some(match event {
                    CombatEvent::CombatEnded { fight_id } => *fight_id,
                    _ => None,
                });
            }
            signals.extend(
                self.turn
                    .apply(event, locked, |spell| engine.is_class_spell(spell)),
            );
        }

        if let Some(fight_id) = combat_end {
            self.reset_combat(fight_id);
            return signals;
        }

        // ═══════════════════════════════════════════════════════════════════════
        // PHASE 2: Fighter roster
        // ═══════════════════════════════════════════════════════════════════════

        signals.extend(self.handle_roster(line));

        // ═══════════════════════════════════════════════════════════════════════
        // PHASE 3: Timeline and combos (tracked class casts only)
        // ═══════════════════════════════════════════════════════════════════════

        signals.extend(self.handle_tracked_cast(line));

        // ═══════════════════════════════════════════════════════════════════════
        // PHASE 4: Class resources, then retroactive cost fixes
        // ═══════════════════════════════════════════════════════════════════════

        if let Some(fix) = self.engine.apply(line, self.turn.state())
            && self.timeline.correct_last(fix.spell, fix.cost)
        {
            tracing::debug!(spell = fix.spell, cost = fix.cost, "Timeline cost corrected");
            signals.push(GameSignal::CostCorrected {
                spell: fix.spell,
                cost: fix.cost,
            });
        }

        // ═══════════════════════════════════════════════════════════════════════
        // PHASE 5: Turn boundary
        // ═══════════════════════════════════════════════════════════════════════

        if line.events.contains(&CombatEvent::TurnPassed) {
            self.timeline.clear();
            self.combos.end_turn();
        }

        signals
    }

    fn reset_combat(&mut self, fight_id: Option<u64>) {
        self.engine.reset();
        self.combos.reset();
        self.timeline.clear();
        self.roster.clear();
        tracing::debug!(character = %self.character, ?fight_id, "Combat state reset");
    }

    fn handle_roster(&mut self, line: &ParsedLine) -> Vec<GameSignal> {
        let mut signals = Vec::new();
        for event in &line.events {
            match event {
                CombatEvent::FighterJoined { name, breed, .. } => {
                    let class = ClassKind::from_breed(*breed);
                    if self.roster.record(name, class) {
                        signals.push(GameSignal::FighterJoined {
                            name: name.clone(),
                            class,
                        });
                    }
                }
                CombatEvent::SpellCast { caster, spell } => {
                    if let Some(class) = self.roster.record_cast(caster, spell) {
                        signals.push(GameSignal::FighterJoined {
                            name: caster.clone(),
                            class: Some(class),
                        });
                    }
                }
                _ => {}
            }
        }
        signals
    }

    fn handle_tracked_cast(&mut self, line: &ParsedLine) -> Vec<GameSignal> {
        let Some((caster, spell)) = line.spell_cast() else {
            return Vec::new();
        };
        if !self.turn.state().is_tracked(caster) || !self.engine.is_class_spell(spell) {
            return Vec::new();
        }
        let Some(cost) = self.engine.display_cost(spell) else {
            return Vec::new();
        };

        self.timeline.push(spell, &cost);
        self.combos
            .feed(&cost)
            .into_iter()
            .map(|combo| {
                tracing::debug!(combo, "Combo completed");
                GameSignal::ComboCompleted { combo }
            })
            .collect()
    }

    /// Read-only view for the renderer. Hands out the timeline's pending
    /// eviction, so each eviction shows up in exactly one snapshot.
    pub fn snapshot(&mut self, dedup: DedupStats) -> OverlaySnapshot {
        let state = self.turn.state();
        OverlaySnapshot {
            character: self.character.clone(),
            class: self.engine.class(),
            in_combat: state.in_combat,
            tracked_player: state.tracked_player.clone(),
            is_tracked_turn: state.is_tracked_turn,
            overlay_visible: state.overlay_visible,
            resources: self.engine.snapshot(),
            combos: self.combos.views(),
            timeline: self.timeline.view(),
            fighters: self.roster.fighters().to_vec(),
            dedup,
        }
    }
}
