//! In-memory boss/user service
//!
//! Backs the CLI's offline mode and the engine tests. Failures can be injected
//! per operation and commits can be paused to hold a reconciliation in flight.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::watch;

use super::{BossRecord, BossService, RemoteError, RemoteUserRecord, RewardTotals};

#[derive(Debug, Default)]
struct Store {
    bosses: Vec<BossRecord>,
    users: HashMap<String, RemoteUserRecord>,
    commits: Vec<(String, RewardTotals)>,
}

#[derive(Debug)]
pub struct MemoryBossService {
    store: Mutex<Store>,
    fail_catalog: AtomicBool,
    fail_user_fetch: AtomicBool,
    fail_commit: AtomicBool,
    user_fetches: AtomicUsize,
    commits_paused: watch::Sender<bool>,
}

impl Default for MemoryBossService {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MemoryBossService {
    pub fn new(bosses: Vec<BossRecord>) -> Self {
        let (commits_paused, _) = watch::channel(false);
        Self {
            store: Mutex::new(Store {
                bosses,
                ..Default::default()
            }),
            fail_catalog: AtomicBool::new(false),
            fail_user_fetch: AtomicBool::new(false),
            fail_commit: AtomicBool::new(false),
            user_fetches: AtomicUsize::new(0),
            commits_paused,
        }
    }

    /// A small fixed catalog used by the offline CLI
    pub fn demo(user_id: &str, attack_power: i64) -> Self {
        let bosses = vec![
            demo_boss("ember-wraith", 1, "Ember Wraith", 120, 15, 30),
            demo_boss("bog-colossus", 2, "Bog Colossus", 250, 35, 60),
            demo_boss("glass-tyrant", 3, "Glass Tyrant", 400, 60, 110),
        ];
        let service = Self::new(bosses);
        service.insert_user(
            user_id,
            RemoteUserRecord {
                attack_power,
                ..Default::default()
            },
        );
        service
    }

    pub fn insert_user(&self, user_id: &str, record: RemoteUserRecord) {
        self.with_store(|store| {
            store.users.insert(user_id.to_string(), record);
        });
    }

    pub fn set_bosses(&self, bosses: Vec<BossRecord>) {
        self.with_store(|store| store.bosses = bosses);
    }

    /// Change the authoritative attack power, as another client would
    pub fn set_attack_power(&self, user_id: &str, attack_power: i64) {
        self.with_store(|store| {
            if let Some(user) = store.users.get_mut(user_id) {
                user.attack_power = attack_power;
            }
        });
    }

    /// Add coin to the stored record behind the engine's back
    pub fn grant_coin(&self, user_id: &str, coin: i64) {
        self.with_store(|store| {
            if let Some(user) = store.users.get_mut(user_id) {
                user.mined_boss_coin += coin;
            }
        });
    }

    pub fn user(&self, user_id: &str) -> Option<RemoteUserRecord> {
        self.with_store(|store| store.users.get(user_id).cloned())
    }

    /// Every committed payload, oldest first
    pub fn commits(&self) -> Vec<(String, RewardTotals)> {
        self.with_store(|store| store.commits.clone())
    }

    pub fn user_fetch_count(&self) -> usize {
        self.user_fetches.load(Ordering::SeqCst)
    }

    pub fn fail_catalog(&self, fail: bool) {
        self.fail_catalog.store(fail, Ordering::SeqCst);
    }

    pub fn fail_user_fetch(&self, fail: bool) {
        self.fail_user_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_commit(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    /// Hold every commit until `resume_commits` is called
    pub fn pause_commits(&self) {
        self.commits_paused.send_replace(true);
    }

    pub fn resume_commits(&self) {
        self.commits_paused.send_replace(false);
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut Store) -> T) -> T {
        let mut store = self
            .store
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut store)
    }
}

impl BossService for MemoryBossService {
    async fn list_bosses(&self) -> Result<Vec<BossRecord>, RemoteError> {
        if self.fail_catalog.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable {
                reason: "catalog offline".to_string(),
            });
        }
        Ok(self.with_store(|store| store.bosses.clone()))
    }

    async fn fetch_user(&self, user_id: &str) -> Result<RemoteUserRecord, RemoteError> {
        self.user_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_user_fetch.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable {
                reason: "user store offline".to_string(),
            });
        }
        self.user(user_id).ok_or_else(|| RemoteError::UnknownUser {
            user_id: user_id.to_string(),
        })
    }

    async fn commit_totals(&self, user_id: &str, totals: RewardTotals) -> Result<(), RemoteError> {
        let mut paused = self.commits_paused.subscribe();
        // Sender lives in self, so the channel cannot close while we wait
        let _ = paused.wait_for(|paused| !*paused).await;

        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable {
                reason: "user store rejected write".to_string(),
            });
        }
        self.with_store(|store| {
            let user = store
                .users
                .get_mut(user_id)
                .ok_or_else(|| RemoteError::UnknownUser {
                    user_id: user_id.to_string(),
                })?;
            user.mined_boss_coin = totals.mined_boss_coin;
            user.total_experience = totals.total_experience;
            store.commits.push((user_id.to_string(), totals));
            Ok(())
        })
    }
}

fn demo_boss(id: &str, display_id: u64, name: &str, health: i64, coin: i64, xp: i64) -> BossRecord {
    BossRecord {
        id: id.to_string(),
        display_id,
        name: name.to_string(),
        health,
        image_ref: format!("{id}.png"),
        coin_reward: coin,
        experience_reward: xp,
    }
}
