//! Remote boss/user service contract
//!
//! The service is the authority for the boss catalog and for the user's
//! attack power and cumulative rewards. The core only ever:
//! - lists bosses
//! - reads a user snapshot
//! - writes new reward totals computed from a snapshot it just read
mod error;
mod http;
mod lenient;
mod memory;

pub use error::RemoteError;
pub use http::HttpBossService;
pub use memory::MemoryBossService;

use serde::{Deserialize, Serialize};
use std::future::Future;

use lenient::{lenient, lenient_id};

// ─────────────────────────────────────────────────────────────────────────────
// Service Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Operations the encounter engine needs from the remote service.
///
/// Futures are `Send` so reconciliation can run on a spawned tokio task.
pub trait BossService: Send + Sync {
    /// `GET bosses`
    fn list_bosses(&self) -> impl Future<Output = Result<Vec<BossRecord>, RemoteError>> + Send;

    /// `GET user/{id}`
    fn fetch_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<RemoteUserRecord, RemoteError>> + Send;

    /// `PUT user/{id}` with the new cumulative totals
    fn commit_totals(
        &self,
        user_id: &str,
        totals: RewardTotals,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Records
// ─────────────────────────────────────────────────────────────────────────────

/// Boss record as served by `GET bosses`.
///
/// Decoded through [`RawBossRecord`], so legacy and newer field names are
/// both accepted, even side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawBossRecord")]
pub struct BossRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub display_id: u64,
    pub name: String,
    pub health: i64,
    pub image_ref: String,
    pub coin_reward: i64,
    pub experience_reward: i64,
}

/// Every spelling the catalog has used. Newer names win over legacy ones,
/// except `_id`, which is the primary key on the service.
#[derive(Deserialize)]
struct RawBossRecord {
    #[serde(default, rename = "_id", deserialize_with = "lenient_id")]
    legacy_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default, rename = "displayId")]
    display_id: u64,
    name: String,
    health: i64,
    #[serde(rename = "imageRef")]
    image_ref: Option<String>,
    #[serde(rename = "imageSrc")]
    image_src: Option<String>,
    #[serde(rename = "coinReward")]
    coin_reward: Option<i64>,
    #[serde(rename = "coinAmount")]
    coin_amount: Option<i64>,
    #[serde(rename = "experienceReward")]
    experience_reward: Option<i64>,
    #[serde(rename = "experienceAmount")]
    experience_amount: Option<i64>,
}

impl TryFrom<RawBossRecord> for BossRecord {
    type Error = String;

    fn try_from(raw: RawBossRecord) -> Result<Self, Self::Error> {
        let id = raw
            .legacy_id
            .or(raw.id)
            .ok_or_else(|| format!("boss '{}' has no id", raw.name))?;
        Ok(Self {
            id,
            display_id: raw.display_id,
            name: raw.name,
            health: raw.health,
            image_ref: raw.image_ref.or(raw.image_src).unwrap_or_default(),
            coin_reward: raw.coin_reward.or(raw.coin_amount).unwrap_or(0),
            experience_reward: raw
                .experience_reward
                .or(raw.experience_amount)
                .unwrap_or(0),
        })
    }
}

/// Profile fields carried alongside the combat totals.
///
/// Display-only: a field with an unexpected shape reads as `None` instead of
/// failing the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub language_code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_premium: Option<bool>,
}

impl UserProfile {
    /// Best available display name
    pub fn display_name(&self) -> Option<String> {
        if let Some(username) = &self.username {
            return Some(username.clone());
        }
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(first), None) => Some(first.clone()),
            _ => None,
        }
    }
}

/// Snapshot of the user record as served by `GET user/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawUserRecord")]
pub struct RemoteUserRecord {
    pub attack_power: i64,
    pub mined_boss_coin: i64,
    pub total_experience: i64,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// Older records used `total_exp` or `Experience` for the experience total,
/// and some carry more than one. `totalExperience` wins, then `total_exp`.
#[derive(Deserialize)]
struct RawUserRecord {
    #[serde(rename = "attackPower")]
    attack_power: i64,
    #[serde(default, rename = "minedBossCoin")]
    mined_boss_coin: i64,
    #[serde(rename = "totalExperience")]
    total_experience: Option<i64>,
    total_exp: Option<i64>,
    #[serde(rename = "Experience")]
    experience: Option<i64>,
    #[serde(flatten)]
    profile: UserProfile,
}

impl From<RawUserRecord> for RemoteUserRecord {
    fn from(raw: RawUserRecord) -> Self {
        Self {
            attack_power: raw.attack_power,
            mined_boss_coin: raw.mined_boss_coin,
            total_experience: raw
                .total_experience
                .or(raw.total_exp)
                .or(raw.experience)
                .unwrap_or(0),
            profile: raw.profile,
        }
    }
}

/// Payload for `PUT user/{id}`: the new cumulative totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardTotals {
    pub mined_boss_coin: i64,
    pub total_experience: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boss_record_accepts_legacy_field_names() {
        let json = r#"{
            "_id": "64f1",
            "name": "Gorgoth",
            "health": 500,
            "imageSrc": "https://cdn.test/gorgoth.png",
            "coinAmount": 25,
            "experienceAmount": 40
        }"#;
        let record: BossRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "64f1");
        assert_eq!(record.display_id, 0);
        assert_eq!(record.image_ref, "https://cdn.test/gorgoth.png");
        assert_eq!(record.coin_reward, 25);
        assert_eq!(record.experience_reward, 40);
    }

    #[test]
    fn boss_record_accepts_current_field_names() {
        let json = r#"{
            "id": "b-2",
            "displayId": 7,
            "name": "Wyrm",
            "health": 90,
            "imageRef": "wyrm.png",
            "coinReward": 3,
            "experienceReward": 9
        }"#;
        let record: BossRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "b-2");
        assert_eq!(record.display_id, 7);
        assert_eq!(record.coin_reward, 3);
        assert_eq!(record.experience_reward, 9);
    }

    #[test]
    fn user_record_reads_profile_and_legacy_experience() {
        let json = r#"{
            "attackPower": 20,
            "minedBossCoin": 100,
            "total_exp": 55,
            "id": 991,
            "first_name": "Ada",
            "language_code": "en"
        }"#;
        let record: RemoteUserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.attack_power, 20);
        assert_eq!(record.mined_boss_coin, 100);
        assert_eq!(record.total_experience, 55);
        assert_eq!(record.profile.id.as_deref(), Some("991"));
        assert_eq!(record.profile.display_name().as_deref(), Some("Ada"));
    }

    #[test]
    fn user_record_tolerates_several_experience_names() {
        let json = r#"{ "attackPower": 5, "totalExperience": 10, "Experience": 3 }"#;
        let record: RemoteUserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.total_experience, 10);

        let json = r#"{ "attackPower": 5, "total_exp": 7, "Experience": 3 }"#;
        let record: RemoteUserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.total_experience, 7);

        let json = r#"{ "attackPower": 5, "Experience": 3 }"#;
        let record: RemoteUserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.total_experience, 3);
    }

    #[test]
    fn odd_profile_fields_do_not_block_the_snapshot() {
        let json = r#"{
            "_id": "abc",
            "id": "tg-1",
            "attackPower": 5,
            "username": 42,
            "is_premium": "yes"
        }"#;
        let record: RemoteUserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.attack_power, 5);
        assert_eq!(record.profile.id.as_deref(), Some("tg-1"));
        assert_eq!(record.profile.username, None);
        assert_eq!(record.profile.is_premium, None);
    }

    #[test]
    fn boss_record_accepts_both_id_spellings_together() {
        let json = r#"{
            "_id": "64f1",
            "id": 12,
            "name": "Twin",
            "health": 80,
            "coinAmount": 4,
            "coinReward": 6
        }"#;
        let record: BossRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "64f1");
        assert_eq!(record.coin_reward, 6);
        assert_eq!(record.experience_reward, 0);

        let json = r#"{ "name": "Nameless", "health": 1 }"#;
        assert!(serde_json::from_str::<BossRecord>(json).is_err());
    }

    #[test]
    fn user_record_requires_attack_power() {
        let json = r#"{ "minedBossCoin": 1, "totalExperience": 2 }"#;
        assert!(serde_json::from_str::<RemoteUserRecord>(json).is_err());
    }

    #[test]
    fn totals_serialize_in_camel_case() {
        let totals = RewardTotals {
            mined_boss_coin: 130,
            total_experience: 75,
        };
        let json = serde_json::to_value(totals).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "minedBossCoin": 130, "totalExperience": 75 })
        );
    }
}
