use phf::phf_map;
use waksense_types::{ClassKind, ResourceSnapshot};

use super::{Counter, CostCorrection, ResourceEngine, flag_view, tracked_cast, wrap_with_spill};
use crate::combat_log::{CombatEvent, ParsedLine};
use crate::combo::ComboDefinition;
use crate::signal_processor::TrackedTurnState;

/// Iop spells and the cost shown on the timeline and fed to the combo matcher.
pub(crate) static IOP_SPELLS: phf::Map<&'static str, &'static str> = phf_map! {
    "Épée céleste" => "2PA",
    "Fulgur" => "3PA",
    "Super Iop Punch" => "4PA",
    "Jugement" => "1PA",
    "Colère de Iop" => "6PA",
    "Ébranler" => "2PA",
    "Roknocerok" => "4PA",
    "Fendoir" => "3PA",
    "Ravage" => "5PA",
    "Jabs" => "3PA",
    "Rafale" => "1PA",
    "Torgnole" => "2PA",
    "Tannée" => "4PA",
    "Épée de Iop" => "3PA",
    "Bond" => "4PA",
    "Focus" => "2PA",
    "Éventrail" => "1PM",
    "Uppercut" => "1PW",
    "Amplification" => "2PM",
    "Duel" => "1PA",
    "Étendard de bravoure" => "3PA",
    "Vertu" => "2PA",
    "Charge" => "1PA",
};

static IOP_COMBOS: [ComboDefinition; 5] = [
    ComboDefinition {
        id: "Vol de vie",
        tokens: &["1PM", "3PA", "3PA"],
    },
    ComboDefinition {
        id: "Poussée",
        tokens: &["1PA", "1PA", "2PA"],
    },
    ComboDefinition {
        id: "Préparation",
        tokens: &["1PM", "1PM", "1PW"],
    },
    ComboDefinition {
        id: "Dommages supplémentaires",
        tokens: &["2PA", "1PA", "1PM"],
    },
    ComboDefinition {
        id: "Combo PA",
        tokens: &["1PW", "3PA", "1PW", "1PA"],
    },
];

const CONCENTRATION: &str = "Concentration";
const COURROUX: &str = "Courroux";
const PUISSANCE: &str = "Puissance";
const PREPARATION: &str = "Préparation";

const ETENDARD: &str = "Étendard de bravoure";
const BOND: &str = "Bond";
const CHARGE: &str = "Charge";

const COURROUX_SPENDERS: [&str; 3] = ["Super Iop Punch", "Roknocerok", "Tannée"];
const EGARE_SPELLS: [&str; 2] = ["Fulgur", "Colère de Iop"];
const PUISSANCE_ON_ENGAGE: u32 = 30;
const PUISSANCE_ISOLATION_LOSS: u32 = 10;

/// Spell whose real cost is only known from the lines right after its cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VariableCost {
    Etendard,
    Bond,
    Charge,
}

impl VariableCost {
    fn for_spell(spell: &str) -> Option<Self> {
        match spell {
            ETENDARD => Some(Self::Etendard),
            BOND => Some(Self::Bond),
            CHARGE => Some(Self::Charge),
            _ => None,
        }
    }

    fn spell(self) -> &'static str {
        match self {
            Self::Etendard => ETENDARD,
            Self::Bond => BOND,
            Self::Charge => CHARGE,
        }
    }

    /// Corrected cost if this line settles it.
    fn resolve(self, line: &ParsedLine) -> Option<&'static str> {
        match self {
            Self::Etendard => {
                if line.contains("Invoque un(e) Étendard de Bravoure") {
                    Some("3PA")
                } else if line.contains("se téléporte")
                    || (line.contains("est détruit") && line.contains("Étendard de Bravoure"))
                {
                    Some("2PA")
                } else {
                    None
                }
            }
            // the proc line carries the (Impétueux) tag, or reports PA
            Self::Bond => ((line.contains("Impétueux (+") && line.contains("(Impétueux)"))
                || (line.contains("PA") && line.contains("Impétueux")))
            .then_some("0PA"),
            Self::Charge => {
                if line.contains("Se rapproche de 1 case") {
                    Some("2PA")
                } else if line.contains("Se rapproche de 2 cases") {
                    Some("3PA")
                } else if line.contains("Se rapproche de 3 cases") {
                    Some("4PA")
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct IopEngine {
    concentration: Counter,
    courroux: Counter,
    puissance: Counter,
    preparation: Counter,
    egare: bool,
    /// Caster whose next landed hit spends Préparation
    pending_preparation: Option<String>,
    puissance_seeded: bool,
    variable_cost: Option<VariableCost>,
}

impl Default for IopEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl IopEngine {
    pub fn new() -> Self {
        Self {
            concentration: Counter::new(100),
            courroux: Counter::new(4),
            puissance: Counter::new(50),
            preparation: Counter::new(u32::MAX),
            egare: false,
            pending_preparation: None,
            puissance_seeded: false,
            variable_cost: None,
        }
    }

    pub fn preparation_pending(&self) -> bool {
        self.pending_preparation.is_some()
    }

    /// A cast that leaves Préparation pending doesn't also set Égaré.
    fn on_tracked_cast(&mut self, caster: &str, spell: &str) {
        if !self.puissance_seeded {
            self.puissance_seeded = true;
            self.puissance.set(PUISSANCE_ON_ENGAGE);
        }

        self.variable_cost = VariableCost::for_spell(spell);

        if COURROUX_SPENDERS.contains(&spell) {
            self.courroux.clear();
        }
        if !self.preparation.is_empty() {
            // spent only once the hit lands
            self.pending_preparation = Some(caster.to_string());
            tracing::debug!(caster, spell, "Préparation loss pending");
        } else if EGARE_SPELLS.contains(&spell) {
            self.egare = true;
        }
    }

    fn on_report(&mut self, resource: &str, total: u32, event: &CombatEvent) {
        match resource {
            CONCENTRATION => {
                if wrap_with_spill(&mut self.concentration, total, &mut []) > 0 {
                    self.egare = false;
                }
            }
            COURROUX if event.has_tag("Compulsion") || event.has_tag(CONCENTRATION) => {
                self.courroux.set(total);
            }
            PUISSANCE => self.puissance.set(total),
            PREPARATION => self.preparation.set(total),
            _ => {}
        }
    }
}

impl ResourceEngine for IopEngine {
    fn class(&self) -> ClassKind {
        ClassKind::Iop
    }

    fn is_class_spell(&self, spell: &str) -> bool {
        IOP_SPELLS.contains_key(spell)
    }

    fn display_cost(&self, spell: &str) -> Option<String> {
        IOP_SPELLS.get(spell).map(|cost| cost.to_string())
    }

    fn combos(&self) -> &'static [ComboDefinition] {
        &IOP_COMBOS
    }

    fn apply(&mut self, line: &ParsedLine, turn: &TrackedTurnState) -> Option<CostCorrection> {
        if let Some(spell) = tracked_cast(line, turn) {
            let caster = turn.tracked_player.as_deref().unwrap_or_default();
            self.on_tracked_cast(caster, spell);
            return None;
        }

        let mut correction = None;
        if let Some(window) = self.variable_cost {
            if let Some(cost) = window.resolve(line) {
                self.variable_cost = None;
                tracing::debug!(spell = window.spell(), cost, "Variable cost resolved");
                correction = Some(CostCorrection {
                    spell: window.spell(),
                    cost,
                });
            }
        }

        for event in &line.events {
            match event {
                CombatEvent::ResourceReport {
                    resource, total, ..
                } => self.on_report(resource, *total, event),
                CombatEvent::BuffLost { target, buff, .. } if turn.is_tracked(target) => {
                    if buff == COURROUX && event.has_tag("Compulsion") {
                        self.courroux.clear();
                    } else if buff == PUISSANCE && event.has_tag("Iop isolé") {
                        self.puissance.sub(PUISSANCE_ISOLATION_LOSS);
                    }
                }
                CombatEvent::Damage { .. } => {
                    let attacker = turn.last_caster.as_deref();
                    if self.pending_preparation.is_some()
                        && self.pending_preparation.as_deref() == attacker
                    {
                        self.preparation.clear();
                        self.pending_preparation = None;
                        tracing::debug!(caster = ?attacker, "Préparation spent");
                    }
                    if event.has_tag(COURROUX) {
                        self.courroux.clear();
                    }
                }
                CombatEvent::TurnPassed => self.egare = false,
                _ => {}
            }
        }

        correction
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            counters: vec![
                self.concentration.view(CONCENTRATION),
                self.courroux.view(COURROUX),
                self.puissance.view(PUISSANCE),
                self.preparation.view(PREPARATION),
            ],
            flags: vec![
                flag_view("Égaré", self.egare),
                flag_view("Préparation en attente", self.pending_preparation.is_some()),
            ],
        }
    }
}
