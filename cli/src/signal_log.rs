use waksense_core::types::OverlaySnapshot;
use waksense_core::{GameSignal, SignalHandler};

/// Writes every pipeline signal to the log, tagged with its character.
pub struct SignalLogger {
    character: String,
}

impl SignalLogger {
    pub fn new(character: impl Into<String>) -> Self {
        Self {
            character: character.into(),
        }
    }
}

impl SignalHandler for SignalLogger {
    fn handle_signal(&mut self, signal: &GameSignal, snapshot: &OverlaySnapshot) {
        match signal {
            GameSignal::TrackedTurnStarted { player } => {
                tracing::info!(character = %self.character, %player, "Tracked turn started");
            }
            GameSignal::TrackedTurnEnded {
                player,
                overlay_kept,
            } => {
                tracing::info!(
                    character = %self.character,
                    player = ?player,
                    overlay_kept,
                    "Tracked turn ended"
                );
            }
            GameSignal::ComboCompleted { combo } => {
                tracing::info!(character = %self.character, combo, "Combo completed");
            }
            GameSignal::CostCorrected { spell, cost } => {
                tracing::debug!(character = %self.character, spell, cost, "Timeline cost corrected");
            }
            other => {
                tracing::debug!(
                    character = %self.character,
                    signal = ?other,
                    in_combat = snapshot.in_combat,
                    "Signal"
                );
            }
        }
    }

    fn on_combat_start(&mut self) {
        tracing::info!(character = %self.character, "Combat started");
    }

    fn on_combat_end(&mut self, fight_id: Option<u64>) {
        tracing::info!(character = %self.character, fight_id = ?fight_id, "Combat ended");
    }
}
