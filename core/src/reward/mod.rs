//! Reward reconciliation
//!
//! Commits a defeated boss's reward to the remote user record. Totals are
//! always computed from a snapshot fetched immediately before the write, so
//! concurrent changes made by other clients are preserved.

use tracing::{info, warn};

use crate::combat::DefeatTicket;
use crate::encounter::SessionError;
use crate::remote::{BossService, RemoteUserRecord, RewardTotals};

/// Coin and experience granted for one defeated boss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewardOutcome {
    pub coin: i64,
    pub xp: i64,
}

impl RewardOutcome {
    /// Rewards are boss-defined and independent of attack power
    pub fn for_ticket(ticket: &DefeatTicket) -> Self {
        Self {
            coin: ticket.boss.coin_reward,
            xp: ticket.boss.xp_reward,
        }
    }

    /// New cumulative totals: the snapshot plus this reward
    pub fn apply_to(&self, snapshot: &RemoteUserRecord) -> RewardTotals {
        RewardTotals {
            mined_boss_coin: snapshot.mined_boss_coin.saturating_add(self.coin),
            total_experience: snapshot.total_experience.saturating_add(self.xp),
        }
    }
}

/// Outcome of a successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub reward: RewardOutcome,
    /// Totals written to the remote record
    pub committed: RewardTotals,
    /// Authoritative attack power from the snapshot
    pub attack_power: i64,
}

/// Fetch a fresh snapshot, compute the reward and commit the new totals.
///
/// Any remote failure is reported as `ReconciliationFailed`; nothing is
/// committed in that case and the caller keeps the encounter defeated.
pub async fn reconcile<S: BossService>(
    service: &S,
    ticket: &DefeatTicket,
) -> Result<Reconciliation, SessionError> {
    let snapshot = service
        .fetch_user(&ticket.user_id)
        .await
        .map_err(|source| {
            warn!(user_id = %ticket.user_id, error = %source, "user snapshot unavailable");
            SessionError::ReconciliationFailed(source)
        })?;

    let reward = RewardOutcome::for_ticket(ticket);
    let committed = reward.apply_to(&snapshot);

    service
        .commit_totals(&ticket.user_id, committed)
        .await
        .map_err(|source| {
            warn!(user_id = %ticket.user_id, error = %source, "reward commit failed");
            SessionError::ReconciliationFailed(source)
        })?;

    info!(
        user_id = %ticket.user_id,
        boss_id = %ticket.boss.id,
        coin = reward.coin,
        xp = reward.xp,
        mined_boss_coin = committed.mined_boss_coin,
        total_experience = committed.total_experience,
        final_blow_power = ticket.attack_power,
        fresh_power = snapshot.attack_power,
        "reward committed"
    );

    Ok(Reconciliation {
        reward,
        committed,
        attack_power: snapshot.attack_power,
    })
}
