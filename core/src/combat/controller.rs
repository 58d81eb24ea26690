//! Combat state machine for a single boss encounter.
//!
//! - Idle: no active boss
//! - Engaging: boss alive, strikes land
//! - Defeated: health reached zero, reward not yet committed
//!
//! Every transition goes through this controller. Callers act on the values
//! it returns (health changes, defeat) and never re-derive transitions.

use thiserror::Error;
use tracing::{debug, info};

use super::CombatSession;
use crate::catalog::BossEntity;
use crate::encounter::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombatState {
    #[default]
    Idle,
    Engaging,
    Defeated,
}

impl CombatState {
    pub fn label(&self) -> &'static str {
        match self {
            CombatState::Idle => "idle",
            CombatState::Engaging => "engaging",
            CombatState::Defeated => "defeated",
        }
    }
}

/// Result of a strike that landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikeResult {
    pub new_health: i64,
    pub max_health: i64,
    pub damage: i64,
    /// True only for the strike that brought health to zero
    pub defeated: bool,
}

/// Why a strike was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StrikeRejected {
    #[error("no boss to strike")]
    NoEncounter,

    #[error("boss is already defeated")]
    AlreadyDefeated,

    #[error("rewards are being reconciled")]
    Reconciling,
}

/// Everything reconciliation needs about a defeated boss.
///
/// Handed out once per defeat by [`CombatController::begin_reconciliation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefeatTicket {
    pub boss: BossEntity,
    pub user_id: String,
    /// Attack power that landed the final blow
    pub attack_power: i64,
    /// Session the ticket was issued for; any later start or clear invalidates it
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct CombatController {
    user_id: String,
    state: CombatState,
    session: Option<CombatSession>,
    /// Cached attack power for the next session
    attack_power: i64,
    reconciling: bool,
    rewarded: bool,
    /// Bumped by every `start` and `clear`
    generation: u64,
}

impl CombatController {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn session(&self) -> Option<&CombatSession> {
        self.session.as_ref()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn attack_power(&self) -> i64 {
        self.attack_power
    }

    pub fn is_reconciling(&self) -> bool {
        self.reconciling
    }

    pub fn is_alive(&self) -> bool {
        self.session.as_ref().is_some_and(CombatSession::is_alive)
    }

    /// Replace the cached attack power used by the next `start`
    pub fn set_attack_power(&mut self, attack_power: i64) {
        self.attack_power = attack_power;
    }

    /// Begin a new engagement. Any previous session is dropped.
    ///
    /// A defeat whose reward is still uncommitted blocks the start; call
    /// [`CombatController::clear`] to abandon it explicitly.
    pub fn start(
        &mut self,
        boss: BossEntity,
        attack_power: i64,
    ) -> Result<&CombatSession, SessionError> {
        if self.reconciling {
            return Err(SessionError::ReconciliationInFlight);
        }
        if self.state == CombatState::Defeated && !self.rewarded {
            return Err(SessionError::RewardPending);
        }

        info!(
            boss_id = %boss.id,
            boss = %boss.name,
            max_health = boss.max_health,
            attack_power,
            previous_state = self.state.label(),
            "encounter started"
        );

        self.attack_power = attack_power;
        self.rewarded = false;
        self.generation += 1;
        self.state = CombatState::Engaging;
        let session = CombatSession::new(boss, attack_power, self.user_id.clone());
        Ok(&*self.session.insert(session))
    }

    /// Apply one strike.
    ///
    /// Reports `defeated` exactly once per session; later strikes are rejected.
    pub fn strike(&mut self) -> Result<StrikeResult, StrikeRejected> {
        match self.state {
            CombatState::Idle => return Err(StrikeRejected::NoEncounter),
            CombatState::Defeated if self.reconciling => return Err(StrikeRejected::Reconciling),
            CombatState::Defeated => return Err(StrikeRejected::AlreadyDefeated),
            CombatState::Engaging => {}
        }

        let Some(session) = self.session.as_mut() else {
            self.state = CombatState::Idle;
            return Err(StrikeRejected::NoEncounter);
        };

        let damage = session.apply_strike();
        let defeated = !session.is_alive();
        let result = StrikeResult {
            new_health: session.current_health(),
            max_health: session.max_health(),
            damage,
            defeated,
        };

        debug!(damage, health = result.new_health, max = result.max_health, "strike");

        if defeated {
            self.state = CombatState::Defeated;
            info!(
                boss_id = %session.active_boss().id,
                elapsed_secs = session.elapsed_secs(),
                "boss defeated"
            );
        }
        Ok(result)
    }

    /// Claim the defeated boss for reconciliation.
    ///
    /// Fails while another reconciliation holds the ticket or once the reward
    /// has been committed.
    pub fn begin_reconciliation(&mut self) -> Result<DefeatTicket, SessionError> {
        if self.state != CombatState::Defeated || self.rewarded {
            return Err(SessionError::NotDefeated);
        }
        if self.reconciling {
            return Err(SessionError::ReconciliationInFlight);
        }
        let session = self.session.as_ref().ok_or(SessionError::NotDefeated)?;

        self.reconciling = true;
        Ok(DefeatTicket {
            boss: session.active_boss().clone(),
            user_id: session.user_id().to_string(),
            attack_power: session.attack_power(),
            generation: self.generation,
        })
    }

    /// Whether `ticket` is the one currently out for the live defeat
    pub fn holds_ticket(&self, ticket: &DefeatTicket) -> bool {
        self.reconciling
            && self.state == CombatState::Defeated
            && self.generation == ticket.generation
            && self.user_id == ticket.user_id
            && self
                .session
                .as_ref()
                .is_some_and(|session| session.active_boss().id == ticket.boss.id)
    }

    /// Release the ticket after a failed reconciliation so it can be retried.
    pub fn abandon_reconciliation(&mut self) {
        self.reconciling = false;
    }

    /// Mark the reward committed and adopt the authoritative attack power for
    /// the next session. The finished session itself is left untouched.
    pub fn finish_reconciliation(&mut self, fresh_attack_power: i64) {
        if fresh_attack_power != self.attack_power {
            info!(
                cached = self.attack_power,
                fresh = fresh_attack_power,
                "attack power changed remotely; applies from next encounter"
            );
        }
        self.attack_power = fresh_attack_power;
        self.reconciling = false;
        self.rewarded = true;
    }

    /// Whether the current defeat has already been rewarded
    pub fn is_rewarded(&self) -> bool {
        self.rewarded
    }

    /// Drop the session and return to Idle.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.session = None;
        self.state = CombatState::Idle;
        self.reconciling = false;
        self.rewarded = false;
    }
}
