//! Class resource engines.
//!
//! Every class implements [`ResourceEngine`] over the same parsed line stream.
//! The per-class modules are mostly static rule tables (spell lists, cost
//! tables, trigger phrases) feeding the shared primitives defined here.

mod cra;
mod iop;
mod ouginak;

pub use cra::CraEngine;
pub use iop::IopEngine;
pub use ouginak::OuginakEngine;

pub(crate) use cra::CRA_SPELLS;
pub(crate) use iop::IOP_SPELLS;
pub(crate) use ouginak::OUGINAK_SPELLS;

use waksense_types::{ClassKind, CounterView, FlagView, ResourceSnapshot};

use crate::combat_log::ParsedLine;
use crate::combo::ComboDefinition;
use crate::signal_processor::TrackedTurnState;

/// Retroactive fix for the cost of the latest timeline entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostCorrection {
    pub spell: &'static str,
    pub cost: &'static str,
}

/// Derives one class's resources from the log.
pub trait ResourceEngine: Send {
    fn class(&self) -> ClassKind;

    /// Whether a cast spell belongs to this class's spell list.
    fn is_class_spell(&self, spell: &str) -> bool;

    /// Cost token for the timeline and combo matcher. `None` keeps the cast
    /// off the timeline.
    fn display_cost(&self, spell: &str) -> Option<String>;

    /// Combos tracked for this class
    fn combos(&self) -> &'static [ComboDefinition] {
        &[]
    }

    /// Apply one parsed line. `turn` is the state after the turn machine saw
    /// the same line.
    fn apply(&mut self, line: &ParsedLine, turn: &TrackedTurnState) -> Option<CostCorrection>;

    /// Back to the zero/false initial state.
    fn reset(&mut self);

    fn snapshot(&self) -> ResourceSnapshot;
}

pub fn engine_for(class: ClassKind) -> Box<dyn ResourceEngine> {
    match class {
        ClassKind::Iop => Box::new(IopEngine::new()),
        ClassKind::Cra => Box::new(CraEngine::new()),
        ClassKind::Ouginak => Box::new(OuginakEngine::new()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Primitives
// ─────────────────────────────────────────────────────────────────────────────

/// Integer resource held in `0..=cap`.
///
/// Used for linear counters and stack piles alike; every mutation clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    value: u32,
    cap: u32,
}

impl Counter {
    pub const fn new(cap: u32) -> Self {
        Self { value: 0, cap }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn set(&mut self, value: u32) {
        self.value = value.min(self.cap);
    }

    /// Add up to `amount`, returning how much actually fit under the cap.
    pub fn add(&mut self, amount: u32) -> u32 {
        let before = self.value;
        self.set(self.value.saturating_add(amount));
        self.value - before
    }

    pub fn sub(&mut self, amount: u32) {
        self.value = self.value.saturating_sub(amount);
    }

    pub fn clear(&mut self) {
        self.value = 0;
    }

    /// Change the ceiling, pulling the value down with it.
    pub fn set_cap(&mut self, cap: u32) {
        self.cap = cap;
        self.value = self.value.min(cap);
    }

    pub fn is_empty(&self) -> bool {
        self.value == 0
    }

    pub fn view(&self, name: &str) -> CounterView {
        CounterView {
            name: name.to_string(),
            value: self.value,
            cap: self.cap,
        }
    }
}

pub(crate) fn flag_view(name: &str, active: bool) -> FlagView {
    FlagView {
        name: name.to_string(),
        active,
    }
}

/// Store a reported total into a counter that wraps at its cap.
///
/// Each full multiple of the cap grants one unit to every pile, each pile
/// stopping at its own cap. Returns the number of multiples crossed.
pub fn wrap_with_spill(counter: &mut Counter, total: u32, piles: &mut [&mut Counter]) -> u32 {
    let modulus = counter.cap();
    if modulus == 0 || total < modulus {
        counter.set(total);
        return 0;
    }

    let stacks = total / modulus;
    for pile in piles.iter_mut() {
        pile.add(stacks);
    }
    counter.set(total % modulus);
    stacks
}

/// First table cost whose key is contained in the spell name.
pub(crate) fn cost_by_substring(table: &[(&str, u32)], spell: &str) -> Option<u32> {
    table
        .iter()
        .find(|(key, _)| spell.contains(key))
        .map(|(_, cost)| *cost)
}

pub(crate) fn contains_any(list: &[&str], spell: &str) -> bool {
    list.iter().any(|s| spell.contains(s))
}

/// Tracked-player casts on this line, if any.
pub(crate) fn tracked_cast<'a>(line: &'a ParsedLine, turn: &TrackedTurnState) -> Option<&'a str> {
    let (caster, spell) = line.spell_cast()?;
    turn.is_tracked(caster).then_some(spell)
}
