use phf::phf_map;
use waksense_types::{ClassKind, ResourceSnapshot};

use super::{Counter, CostCorrection, ResourceEngine, contains_any, flag_view, tracked_cast};
use crate::combat_log::{CombatEvent, ParsedLine};
use crate::signal_processor::TrackedTurnState;

pub(crate) static OUGINAK_SPELLS: &[&str] = &[
    "Emeute",
    "Émeute",
    "Fleau",
    "Fléau",
    "Rupture",
    "Plombage",
    "Balafre",
    "Croc-en-jambe",
    "Bastonnade",
    "Molosse",
    "Hachure",
    "Saccade",
    "Balayage",
    "Contusion",
    "Cador",
    "Brise'Os",
    "Brise'O",
    "Baroud",
    "Chasseur",
    "Elan",
    "Élan",
    "Canine",
    "Apaisement",
    "Poursuite",
    "Meute",
    "Proie",
    "Ougigarou",
    "Chienchien",
];

/// Rage spent per cast in Ougigarou mode (the spell's full PA + PW cost).
static RAGE_COSTS: phf::Map<&'static str, u32> = phf_map! {
    "Emeute" => 3,
    "Émeute" => 3,
    "Fléau" => 5,
    "Fleau" => 5,
    "Rupture" => 2,
    "Plombage" => 3,
    "Balafre" => 5,
    "Croc-en-jambe" => 2,
    "Bastonnade" => 4,
    "Molosse" => 4,
    "Hachure" => 3,
    "Saccade" => 4,
    "Balayage" => 4,
    "Contusion" => 3,
    "Cador" => 4,
    "Brise'Os" => 2,
    "Brise'O" => 2,
    "Baroud" => 7,
};

/// First cost of each spell, shown outside Ougigarou mode.
static CAST_COSTS: phf::Map<&'static str, &'static str> = phf_map! {
    "Emeute" => "3PA",
    "Émeute" => "3PA",
    "Fléau" => "4PA",
    "Fleau" => "4PA",
    "Rupture" => "2PA",
    "Plombage" => "3PA",
    "Balafre" => "5PA",
    "Croc-en-jambe" => "2PA",
    "Bastonnade" => "3PA",
    "Molosse" => "4PA",
    "Hachure" => "3PA",
    "Saccade" => "4PA",
    "Balayage" => "4PA",
    "Contusion" => "3PA",
    "Cador" => "3PA",
    "Brise'Os" => "2PA",
    "Brise'O" => "2PA",
    "Baroud" => "6PA",
    "Chasseur" => "2PA",
    "Elan" => "1PA",
    "Élan" => "1PA",
    "Canine" => "3PA",
    "Apaisement" => "2PA",
    "Poursuite" => "3PA",
    "Meute" => "1PW",
    "Proie" => "1PW",
    "Chienchien" => "3PA",
    "Ougigarou" => "2PA",
};

const RAGE: &str = "Rage";
const OUGIGAROU: &str = "Ougigarou";
const RAGE_CAP: u32 = 30;

/// Exact name first, then any table key contained in the cast name.
fn lookup<V: Copy>(table: &phf::Map<&'static str, V>, spell: &str) -> Option<V> {
    table.get(spell).copied().or_else(|| {
        table
            .entries()
            .find(|(key, _)| spell.contains(*key))
            .map(|(_, value)| *value)
    })
}

#[derive(Debug, Clone)]
pub struct OuginakEngine {
    rage: Counter,
    ougigarou: bool,
}

impl Default for OuginakEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OuginakEngine {
    pub fn new() -> Self {
        Self {
            rage: Counter::new(RAGE_CAP),
            ougigarou: false,
        }
    }

    pub fn ougigarou(&self) -> bool {
        self.ougigarou
    }

    fn on_tracked_cast(&mut self, spell: &str) {
        if !self.ougigarou {
            return;
        }
        let Some(cost) = lookup(&RAGE_COSTS, spell) else {
            return;
        };
        self.rage.sub(cost);
        tracing::debug!(spell, cost, remaining = self.rage.value(), "Rage spent");
        if self.rage.is_empty() {
            self.ougigarou = false;
            tracing::debug!("Rage exhausted, Ougigarou ended");
        }
    }
}

impl ResourceEngine for OuginakEngine {
    fn class(&self) -> ClassKind {
        ClassKind::Ouginak
    }

    fn is_class_spell(&self, spell: &str) -> bool {
        contains_any(OUGINAK_SPELLS, spell)
    }

    fn display_cost(&self, spell: &str) -> Option<String> {
        if self.ougigarou {
            if let Some(rage) = lookup(&RAGE_COSTS, spell) {
                return Some(format!("{rage}RG"));
            }
        }
        lookup(&CAST_COSTS, spell).map(str::to_string)
    }

    fn apply(&mut self, line: &ParsedLine, turn: &TrackedTurnState) -> Option<CostCorrection> {
        for event in &line.events {
            match event {
                CombatEvent::ResourceReport {
                    resource, total, ..
                } if resource == RAGE => self.rage.set(*total),
                CombatEvent::BuffGained { target, buff, .. }
                    if buff == OUGIGAROU && turn.is_tracked(target) =>
                {
                    self.ougigarou = true;
                    tracing::debug!(player = %target, "Ougigarou active");
                }
                CombatEvent::BuffLost { buff, .. }
                    if buff == OUGIGAROU && event.has_tag("Rage consommée") =>
                {
                    self.ougigarou = false;
                }
                _ => {}
            }
        }

        if let Some(spell) = tracked_cast(line, turn) {
            self.on_tracked_cast(spell);
        }
        None
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            counters: vec![self.rage.view(RAGE)],
            flags: vec![flag_view(OUGIGAROU, self.ougigarou)],
        }
    }
}
