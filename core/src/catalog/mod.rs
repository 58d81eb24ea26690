//! Boss catalog client
//!
//! Fetches the boss catalog from the remote service and chooses the next
//! encounter. Selection is a pure function of the catalog plus either an
//! injected RNG (random mode) or the previous boss (sequential mode).

use bossrush_types::SelectionMode;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::encounter::SessionError;
use crate::remote::{BossRecord, BossService};

/// Immutable descriptor of one encounter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BossEntity {
    pub id: String,
    /// Numeric id shown to players (alt text, labels)
    pub display_id: u64,
    pub name: String,
    pub max_health: i64,
    pub image_ref: String,
    pub coin_reward: i64,
    pub xp_reward: i64,
}

impl BossEntity {
    pub fn alt_text(&self) -> String {
        format!("Boss {}", self.display_id)
    }
}

impl TryFrom<BossRecord> for BossEntity {
    type Error = &'static str;

    fn try_from(record: BossRecord) -> Result<Self, Self::Error> {
        if record.health <= 0 {
            return Err("health must be positive");
        }
        if record.coin_reward < 0 || record.experience_reward < 0 {
            return Err("rewards must not be negative");
        }
        Ok(Self {
            id: record.id,
            display_id: record.display_id,
            name: record.name,
            max_health: record.health,
            image_ref: record.image_ref,
            coin_reward: record.coin_reward,
            xp_reward: record.experience_reward,
        })
    }
}

/// Fetch every usable boss. An empty result means no encounter is available.
pub async fn list_bosses<S: BossService>(service: &S) -> Result<Vec<BossEntity>, SessionError> {
    let records = service
        .list_bosses()
        .await
        .map_err(SessionError::CatalogUnavailable)?;

    let total = records.len();
    let bosses: Vec<BossEntity> = records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            BossEntity::try_from(record)
                .inspect_err(|reason| warn!(boss_id = %id, reason, "skipping invalid boss record"))
                .ok()
        })
        .collect();

    debug!(total, usable = bosses.len(), "boss catalog loaded");
    Ok(bosses)
}

/// Uniformly random pick from a non-empty catalog.
pub fn pick_next<R: Rng + ?Sized>(
    catalog: &[BossEntity],
    rng: &mut R,
) -> Result<BossEntity, SessionError> {
    catalog.choose(rng).cloned().ok_or(SessionError::EmptyCatalog)
}

/// The boss after `previous` in catalog order, wrapping at the end.
///
/// Starts from the first boss when there is no previous boss or it is no
/// longer in the catalog.
pub fn pick_sequential(
    catalog: &[BossEntity],
    previous: Option<&str>,
) -> Result<BossEntity, SessionError> {
    if catalog.is_empty() {
        return Err(SessionError::EmptyCatalog);
    }
    let next_index = previous
        .and_then(|id| catalog.iter().position(|boss| boss.id == id))
        .map(|index| (index + 1) % catalog.len())
        .unwrap_or(0);
    Ok(catalog[next_index].clone())
}

/// Choose the next boss according to the configured mode.
pub fn select<R: Rng + ?Sized>(
    mode: SelectionMode,
    catalog: &[BossEntity],
    previous: Option<&str>,
    rng: &mut R,
) -> Result<BossEntity, SessionError> {
    match mode {
        SelectionMode::Random => pick_next(catalog, rng),
        SelectionMode::Sequential => pick_sequential(catalog, previous),
    }
}
