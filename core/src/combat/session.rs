//! Live state of one boss engagement

use chrono::{Local, NaiveDateTime};

use crate::catalog::BossEntity;

/// One boss engagement from start to defeat.
///
/// Health is kept within `0..=max_health`; only [`CombatSession::apply_strike`]
/// lowers it.
#[derive(Debug, Clone)]
pub struct CombatSession {
    active_boss: BossEntity,
    current_health: i64,
    /// Damage per strike, as known when the session started
    attack_power: i64,
    user_id: String,
    started_at: NaiveDateTime,
}

impl CombatSession {
    pub fn new(boss: BossEntity, attack_power: i64, user_id: impl Into<String>) -> Self {
        Self {
            current_health: boss.max_health.max(0),
            active_boss: boss,
            attack_power,
            user_id: user_id.into(),
            started_at: Local::now().naive_local(),
        }
    }

    pub fn active_boss(&self) -> &BossEntity {
        &self.active_boss
    }

    pub fn current_health(&self) -> i64 {
        self.current_health
    }

    pub fn max_health(&self) -> i64 {
        self.active_boss.max_health
    }

    pub fn attack_power(&self) -> i64 {
        self.attack_power
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    /// Remaining health as 0.0-100.0 for health bars
    pub fn health_percent(&self) -> f32 {
        if self.max_health() <= 0 {
            return 0.0;
        }
        (self.current_health as f32 / self.max_health() as f32) * 100.0
    }

    /// Seconds since the session started
    pub fn elapsed_secs(&self) -> i64 {
        Local::now()
            .naive_local()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// Lower health by the attack power and return the damage dealt.
    ///
    /// Non-positive attack power deals nothing; damage never exceeds the
    /// remaining health.
    pub(crate) fn apply_strike(&mut self) -> i64 {
        let damage = self.attack_power.max(0).min(self.current_health);
        self.current_health -= damage;
        damage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boss(max_health: i64) -> BossEntity {
        BossEntity {
            id: "b".to_string(),
            display_id: 1,
            name: "B".to_string(),
            max_health,
            image_ref: String::new(),
            coin_reward: 1,
            xp_reward: 1,
        }
    }

    #[test]
    fn starts_at_full_health() {
        let session = CombatSession::new(boss(80), 10, "u");
        assert_eq!(session.current_health(), 80);
        assert!(session.is_alive());
        assert!((session.health_percent() - 100.0).abs() < 0.01);
    }

    #[test]
    fn strike_is_clamped_at_zero() {
        let mut session = CombatSession::new(boss(25), 10, "u");
        assert_eq!(session.apply_strike(), 10);
        assert_eq!(session.apply_strike(), 10);
        assert_eq!(session.apply_strike(), 5);
        assert_eq!(session.current_health(), 0);
        assert_eq!(session.apply_strike(), 0);
        assert_eq!(session.current_health(), 0);
        assert!(!session.is_alive());
    }

    #[test]
    fn negative_power_never_heals() {
        let mut session = CombatSession::new(boss(25), -40, "u");
        assert_eq!(session.apply_strike(), 0);
        assert_eq!(session.current_health(), 25);
    }
}
