use super::signal::EncounterSignal;

/// Trait for presenters that react to encounter signals.
/// Implement this for popups, health bars or console output.
pub trait SignalHandler: Send {
    fn handle_signal(&mut self, signal: &EncounterSignal);
}
