pub mod catalog;
pub mod combat;
pub mod context;
pub mod encounter;
pub mod remote;
pub mod reward;
pub mod service;

// Re-exports for convenience
pub use catalog::{BossEntity, list_bosses, pick_next, pick_sequential};
pub use combat::{
    CombatController, CombatSession, CombatState, DefeatTicket, StrikeRejected, StrikeResult,
};
pub use context::{AppConfig, AppConfigExt, ConfigError, SelectionMode};
pub use encounter::{
    Encounter, EncounterSignal, Resolution, ResolutionReport, Rotation, SessionError,
    SignalHandler, run_resolution,
};
pub use remote::{
    BossRecord, BossService, HttpBossService, MemoryBossService, RemoteError, RemoteUserRecord,
    RewardTotals, UserProfile,
};
pub use reward::{Reconciliation, RewardOutcome, reconcile};
pub use service::{EncounterHandle, EncounterService, EncounterStatus, StrikeReply};
