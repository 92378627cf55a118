use super::EngineSignal;

/// Receives signals after each processed line.
pub trait SignalHandler {
    fn handle_signal(&mut self, signal: &EngineSignal);

    fn handle_signals(&mut self, signals: &[EngineSignal]) {
        for signal in signals {
            self.handle_signal(signal);
        }
    }
}
