use crate::catalog::BossEntity;
use crate::reward::RewardOutcome;

/// Signals emitted towards the presentation layer.
/// Presenters only observe these; nothing flows back into the session.
#[derive(Debug, Clone, PartialEq)]
pub enum EncounterSignal {
    /// A new boss is engaged at full health
    EncounterStarted { boss: BossEntity },

    /// A strike landed; presenters play their hit animation
    StrikeAnimationRequested,

    HealthChanged { current: i64, max: i64 },

    /// Boss defeated and its reward committed. Emitted once per boss.
    Defeated { boss: BossEntity, reward: RewardOutcome },

    /// The catalog had no usable boss
    NoEncounterAvailable,

    /// A remote step failed; the session stays where it was
    ResolutionFailed { reason: String },
}
