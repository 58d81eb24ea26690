use tokio::sync::watch;

use crate::catalog::BossEntity;
use crate::combat::CombatState;
use crate::encounter::Encounter;
use crate::remote::BossService;
use crate::reward::RewardOutcome;

// ─────────────────────────────────────────────────────────────────────────────
// Shared State
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only view of the encounter, published after every command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncounterStatus {
    pub state: CombatState,
    pub boss: Option<BossEntity>,
    pub current_health: i64,
    pub max_health: i64,
    /// Cached attack power used by the current or next session
    pub attack_power: i64,
    pub reconciling: bool,
    pub last_reward: Option<RewardOutcome>,
    pub bosses_defeated: u32,
    /// Most recent remote failure, cleared by the next successful step
    pub last_error: Option<String>,
}

impl EncounterStatus {
    pub fn health_percent(&self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        (self.current_health as f32 / self.max_health as f32) * 100.0
    }
}

/// State shared between the service task and its handles
pub struct SharedState {
    pub status: watch::Sender<EncounterStatus>,
}

impl SharedState {
    pub fn new() -> Self {
        let (status, _) = watch::channel(EncounterStatus::default());
        Self { status }
    }

    /// Refresh the session-derived fields, keeping the service-tracked ones
    pub(crate) fn publish<S: BossService, R: rand::Rng + Send>(&self, encounter: &Encounter<S, R>) {
        let controller = encounter.controller();
        self.status.send_modify(|status| {
            status.state = controller.state();
            status.attack_power = controller.attack_power();
            status.reconciling = controller.is_reconciling();
            match controller.session() {
                Some(session) => {
                    status.boss = Some(session.active_boss().clone());
                    status.current_health = session.current_health();
                    status.max_health = session.max_health();
                }
                None => {
                    status.boss = None;
                    status.current_health = 0;
                    status.max_health = 0;
                }
            }
        });
    }

    pub(crate) fn record_reward(&self, reward: RewardOutcome) {
        self.status.send_modify(|status| {
            status.last_reward = Some(reward);
            status.bosses_defeated += 1;
        });
    }

    pub(crate) fn record_error(&self, error: Option<String>) {
        self.status.send_modify(|status| status.last_error = error);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
