pub mod combat_log;
pub mod combo;
pub mod context;
pub mod resources;
pub mod roster;
pub mod signal_processor;
pub mod timeline;

// Re-exports for convenience
pub use combat_log::*;
pub use combo::{ComboDefinition, ComboMatcher};
pub use context::{AppConfigExt, CharacterPipeline, ConfigError, LockFlag, PipelineError};
pub use resources::{
    CostCorrection, CraEngine, IopEngine, OuginakEngine, ResourceEngine, engine_for,
};
pub use roster::{Roster, detect_class};
pub use signal_processor::{
    EventProcessor, GameSignal, SignalHandler, TrackedTurnState, TurnStateMachine,
};
pub use timeline::CastTimeline;
pub use waksense_types as types;
