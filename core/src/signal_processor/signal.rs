use waksense_types::ClassKind;

/// Signals emitted by the EventProcessor.
/// These are the state transitions a renderer or log consumer cares about,
/// at a higher level than raw log events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameSignal {
    // Combat lifecycle
    CombatStarted,
    CombatEnded {
        fight_id: Option<u64>,
    },
    /// Training dummy fight; a knockout now ends combat
    SpecialCombatFlagged,

    // Turn ownership
    TrackedPlayerAssigned {
        player: String,
    },
    TrackedTurnStarted {
        player: String,
    },
    TrackedTurnEnded {
        player: Option<String>,
        /// Overlay lock kept the overlay on screen
        overlay_kept: bool,
    },

    // Class mechanics
    ComboCompleted {
        combo: &'static str,
    },
    CostCorrected {
        spell: &'static str,
        cost: &'static str,
    },

    FighterJoined {
        name: String,
        class: Option<ClassKind>,
    },
}
