use super::signal::GameSignal;
use waksense_types::OverlaySnapshot;

/// Trait for systems that react to game signals.
/// Implement this for renderers, diagnostics, recorders, etc.
pub trait SignalHandler {
    /// Handle a single signal along with the snapshot taken right after the
    /// line that produced it.
    fn handle_signal(&mut self, signal: &GameSignal, snapshot: &OverlaySnapshot);

    /// Handle multiple signals (default implementation calls handle_signal for each)
    fn handle_signals(&mut self, signals: &[GameSignal], snapshot: &OverlaySnapshot) {
        for signal in signals {
            self.handle_signal(signal, snapshot);
        }
    }

    /// Called when combat starts (optional hook for reset logic)
    fn on_combat_start(&mut self) {}

    /// Called when combat ends (optional hook for cleanup)
    fn on_combat_end(&mut self, _fight_id: Option<u64>) {}
}
