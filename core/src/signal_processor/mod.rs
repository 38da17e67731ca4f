pub mod handler;
pub mod processor;
pub mod signal;

mod combat_state;

#[cfg(test)]
mod processor_tests;

pub use combat_state::{TrackedTurnState, TurnStateMachine};
pub use handler::SignalHandler;
pub use processor::EventProcessor;
pub use signal::GameSignal;
