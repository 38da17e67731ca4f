use chrono::NaiveTime;

/// A single fact extracted from a chat log line.
///
/// Values in reports are the absolute totals printed by the game, never deltas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEvent {
    SpellCast {
        caster: String,
        spell: String,
    },
    /// `<Target>: <Resource> (+N Niv.)`, or the Traqueur rage line
    ResourceReport {
        target: String,
        resource: String,
        total: u32,
        tags: Vec<String>,
    },
    /// `<Target>: <Buff> (Niv. N)`
    BuffGained {
        target: String,
        buff: String,
        tags: Vec<String>,
    },
    /// `<Target>: n'est plus sous l'emprise de '<Buff>' (tag)`
    BuffLost {
        target: String,
        buff: String,
        tags: Vec<String>,
    },
    /// `<Target>: -N PV (element) (tag)`; the line never names the attacker
    Damage {
        target: String,
        amount: u32,
        tags: Vec<String>,
    },
    TurnPassed,
    CombatEnded {
        /// Present when the end came from the fight system line
        fight_id: Option<u64>,
    },
    /// Opening taunt of the training dummy
    SpecialCombatStart,
    /// `<Target> est KO !` / `<Target> est hors-combat`
    Knockout {
        target: String,
    },
    /// Fighter roster line for a player-controlled fighter
    FighterJoined {
        fight_id: u64,
        name: String,
        breed: u32,
    },
}

impl CombatEvent {
    /// True when the event carries the given trailing `(tag)`.
    pub fn has_tag(&self, tag: &str) -> bool {
        match self {
            CombatEvent::ResourceReport { tags, .. }
            | CombatEvent::BuffGained { tags, .. }
            | CombatEvent::BuffLost { tags, .. }
            | CombatEvent::Damage { tags, .. } => tags.iter().any(|t| t == tag),
            _ => false,
        }
    }
}

/// A recognized log line with every event it produced.
///
/// Combat-information lines are always returned, even with no events, since
/// some class rules key on literal phrases rather than on a typed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub line_number: u64,
    pub timestamp: Option<NaiveTime>,
    /// Line text after the `HH:MM:SS,mmm - ` prefix
    pub content: String,
    pub events: Vec<CombatEvent>,
}

impl ParsedLine {
    pub fn contains(&self, needle: &str) -> bool {
        self.content.contains(needle)
    }

    pub fn spell_cast(&self) -> Option<(&str, &str)> {
        self.events.iter().find_map(|e| match e {
            CombatEvent::SpellCast { caster, spell } => Some((caster.as_str(), spell.as_str())),
            _ => None,
        })
    }
}
