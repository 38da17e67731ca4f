use std::collections::VecDeque;

use waksense_types::{ClassKind, ResourceSnapshot};

use super::{
    Counter, CostCorrection, ResourceEngine, contains_any, cost_by_substring, flag_view,
    tracked_cast, wrap_with_spill,
};
use crate::combat_log::{CombatEvent, ParsedLine};
use crate::signal_processor::TrackedTurnState;

pub(crate) static CRA_SPELLS: &[&str] = &[
    "Flèche criblante",
    "Flèche fulminante",
    "Flèche d'immolation",
    "Flèche enflammée",
    "Flèche Ardente",
    "Flèche explosive",
    "Flèche cinglante",
    "Flèche perçante",
    "Flèche destructrice",
    "Flèche chercheuse",
    "Flèche de recul",
    "Flèche tempête",
    "Flèche harcelante",
    "Flèche statique",
    "Balise de destruction",
    "Balise d'alignement",
    "Balise de contact",
    "Tir précis",
    "Débalisage",
    "Eclaireur",
    "Flèche lumineuse",
    "Pluie de flèches",
    "Roulade",
    "Œil de taupe",
];

/// Précision spent per cast while Tir précis is up. First substring match wins.
static PRECISION_COSTS: &[(&str, u32)] = &[
    ("Flèche criblante", 60),
    ("Flèche fulminante", 45),
    ("Flèche d'immolation", 30),
    ("Flèche enflammée", 60),
    ("Flèche Ardente", 30),
    ("Flèche ardente", 30),
    ("Pluie de flèches", 60),
    ("Pluie de fleches", 60),
    ("Flèche explosive", 90),
    ("Flèche cinglante", 45),
    ("Flèche perçante", 75),
    ("Flèche destructrice", 105),
    ("Flèche chercheuse", 30),
    ("Flèche de recul", 60),
    ("Flèche tempête", 45),
    ("Flèche harcelante", 45),
    ("Flèche statique", 90),
];

static BALISE_SPELLS: &[&str] = &[
    "Balise de destruction",
    "Balise d'alignement",
    "Balise de contact",
];

const AFFUTAGE: &str = "Affûtage";
const PRECISION: &str = "Précision";
const LUMINEUSE: &str = "Flèche lumineuse";
const TIR_PRECIS: &str = "Tir précis";
const POINTE_CONSUMED: &str = "Consomme Pointe affûtée";
const PRECISION_CAP_MESSAGE: &str = "Valeur maximale de Précision atteinte !";

const PRECISION_MAX: u32 = 300;
const PRECISION_MAX_ESPRIT: u32 = 200;
/// A gain of exactly this much legitimately hits the normal cap.
const FULL_PRECISION_GAIN: u32 = 300;
const RECENT_GAINS: usize = 5;

/// Affûtage, its two stack piles, Précision and Flèche lumineuse charges.
#[derive(Debug, Clone)]
pub struct CraEngine {
    affutage: Counter,
    pointe: Counter,
    balise: Counter,
    precision: Counter,
    lumineuse: Counter,
    tir_precis: bool,
    /// Inferred talent, see [`CraEngine::on_cap_message`]
    esprit_affute: bool,
    recent_gains: VecDeque<u32>,
}

impl Default for CraEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CraEngine {
    pub fn new() -> Self {
        Self {
            affutage: Counter::new(100),
            pointe: Counter::new(3),
            balise: Counter::new(3),
            precision: Counter::new(PRECISION_MAX),
            lumineuse: Counter::new(5),
            tir_precis: false,
            esprit_affute: false,
            recent_gains: VecDeque::with_capacity(RECENT_GAINS),
        }
    }

    pub fn esprit_affute(&self) -> bool {
        self.esprit_affute
    }

    fn on_precision_report(&mut self, total: u32, capped_line: bool) {
        self.precision.set(total);

        self.recent_gains.push_back(total);
        if self.recent_gains.len() > RECENT_GAINS {
            self.recent_gains.pop_front();
        }

        // Above the talent cap without the cap message: the talent is gone
        if total > PRECISION_MAX_ESPRIT && !capped_line && self.esprit_affute {
            self.esprit_affute = false;
            self.precision.set_cap(PRECISION_MAX);
            self.precision.set(total);
            tracing::debug!(total, "Esprit affûté revoked");
        }
    }

    /// The cap message above 200 means the 200 ceiling of Esprit affûté,
    /// unless the previous gain was a full +300 which hits the normal cap.
    ///
    /// Best-effort heuristic: the log never states the talent directly.
    fn on_cap_message(&mut self, last_gain: Option<u32>) {
        if self.precision.value() <= PRECISION_MAX_ESPRIT || last_gain == Some(FULL_PRECISION_GAIN)
        {
            return;
        }
        self.esprit_affute = true;
        self.precision.set_cap(PRECISION_MAX_ESPRIT);
        self.precision.set(PRECISION_MAX_ESPRIT);
        tracing::debug!("Esprit affûté inferred, Précision capped at 200");
    }

    fn on_tracked_cast(&mut self, spell: &str) {
        if contains_any(BALISE_SPELLS, spell) {
            self.balise.sub(1);
        }
        if spell.contains(LUMINEUSE) {
            self.lumineuse.sub(1);
        }
        if self.tir_precis && !spell.contains(TIR_PRECIS) {
            if let Some(cost) = cost_by_substring(PRECISION_COSTS, spell) {
                self.precision.sub(cost);
                tracing::debug!(spell, cost, remaining = self.precision.value(), "Précision spent");
            }
        }
    }
}

impl ResourceEngine for CraEngine {
    fn class(&self) -> ClassKind {
        ClassKind::Cra
    }

    fn is_class_spell(&self, spell: &str) -> bool {
        contains_any(CRA_SPELLS, spell)
    }

    fn display_cost(&self, _spell: &str) -> Option<String> {
        None
    }

    fn apply(&mut self, line: &ParsedLine, turn: &TrackedTurnState) -> Option<CostCorrection> {
        let capped_line = line.contains(PRECISION_CAP_MESSAGE);
        // the talent check looks at gains before this line's own report
        let last_gain = self.recent_gains.back().copied();

        for event in &line.events {
            match event {
                CombatEvent::ResourceReport {
                    resource, total, ..
                } => match resource.as_str() {
                    AFFUTAGE => {
                        let stacks = wrap_with_spill(
                            &mut self.affutage,
                            *total,
                            &mut [&mut self.pointe, &mut self.balise],
                        );
                        if stacks > 0 {
                            tracing::debug!(
                                total,
                                stacks,
                                pointe = self.pointe.value(),
                                balise = self.balise.value(),
                                "Affûtage overflow"
                            );
                        }
                    }
                    PRECISION => self.on_precision_report(*total, capped_line),
                    LUMINEUSE if (1..=5).contains(total) => self.lumineuse.set(*total),
                    _ => {}
                },
                CombatEvent::BuffGained { buff, .. } if buff.contains(TIR_PRECIS) => {
                    self.tir_precis = true;
                }
                CombatEvent::BuffLost { buff, .. } if buff.contains(TIR_PRECIS) => {
                    self.tir_precis = false;
                }
                CombatEvent::BuffLost { buff, .. } if buff.contains(PRECISION) => {
                    self.precision.clear();
                    self.precision.set_cap(PRECISION_MAX);
                    self.esprit_affute = false;
                }
                _ => {}
            }
        }

        if line.contains(POINTE_CONSUMED) {
            self.pointe.sub(1);
        }
        if let Some(spell) = tracked_cast(line, turn) {
            self.on_tracked_cast(spell);
        }
        if capped_line {
            self.on_cap_message(last_gain);
        }

        None
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            counters: vec![
                self.affutage.view(AFFUTAGE),
                self.precision.view(PRECISION),
                self.pointe.view("Pointe affûtée"),
                self.balise.view("Balise affûtée"),
                self.lumineuse.view(LUMINEUSE),
            ],
            flags: vec![
                flag_view(TIR_PRECIS, self.tir_precis),
                flag_view("Esprit affûté", self.esprit_affute),
            ],
        }
    }
}
