use std::sync::Arc;
use std::time::Duration;

use bossrush_types::SelectionMode;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{EncounterHandle, EncounterService};
use crate::combat::{CombatState, StrikeRejected};
use crate::encounter::Encounter;
use crate::remote::{BossRecord, MemoryBossService, RemoteUserRecord};
use crate::reward::RewardOutcome;

const USER: &str = "player-1";

fn boss(id: &str, health: i64, coin: i64, xp: i64) -> BossRecord {
    BossRecord {
        id: id.to_string(),
        display_id: 7,
        name: id.to_string(),
        health,
        image_ref: format!("{id}.png"),
        coin_reward: coin,
        experience_reward: xp,
    }
}

fn memory_service() -> Arc<MemoryBossService> {
    let service = MemoryBossService::new(vec![boss("a", 60, 10, 20), boss("b", 90, 5, 5)]);
    service.insert_user(
        USER,
        RemoteUserRecord {
            attack_power: 30,
            mined_boss_coin: 100,
            total_experience: 10,
            ..Default::default()
        },
    );
    Arc::new(service)
}

fn spawn(service: &Arc<MemoryBossService>) -> (tokio::task::JoinHandle<()>, EncounterHandle) {
    let encounter = Encounter::with_rng(
        service.clone(),
        USER,
        SelectionMode::Sequential,
        StdRng::seed_from_u64(3),
    );
    EncounterService::spawn(encounter)
}

async fn defeat_first_boss(handle: &EncounterHandle) {
    assert!(!handle.strike().await.unwrap().unwrap().defeated);
    assert!(handle.strike().await.unwrap().unwrap().defeated);
}

#[tokio::test]
async fn strike_before_begin_is_rejected() {
    let service = memory_service();
    let (_task, handle) = spawn(&service);

    assert_eq!(
        handle.strike().await.unwrap(),
        Err(StrikeRejected::NoEncounter)
    );
    assert_eq!(handle.status().state, CombatState::Idle);
}

#[tokio::test]
async fn begin_publishes_the_engaged_boss() {
    let service = memory_service();
    let (_task, handle) = spawn(&service);

    let boss = handle.begin().await.unwrap();
    assert_eq!(boss.id, "a");

    let status = handle.status();
    assert_eq!(status.state, CombatState::Engaging);
    assert_eq!(status.boss.as_ref().map(|b| b.id.as_str()), Some("a"));
    assert_eq!(status.current_health, 60);
    assert_eq!(status.max_health, 60);
    assert_eq!(status.attack_power, 30);
    assert_eq!(status.health_percent(), 100.0);
}

#[tokio::test]
async fn strikes_during_reconciliation_never_reach_the_next_boss() {
    let service = memory_service();
    let (_task, handle) = spawn(&service);
    handle.begin().await.unwrap();

    service.pause_commits();
    defeat_first_boss(&handle).await;

    assert!(handle.status().reconciling);
    assert_eq!(
        handle.strike().await.unwrap(),
        Err(StrikeRejected::Reconciling)
    );

    service.resume_commits();
    let status = handle
        .wait_for_status(|s| s.bosses_defeated == 1 && s.state == CombatState::Engaging)
        .await
        .unwrap();

    assert!(!status.reconciling);
    assert_eq!(status.boss.as_ref().map(|b| b.id.as_str()), Some("b"));
    assert_eq!(status.current_health, 90);
    assert_eq!(status.max_health, 90);
    assert_eq!(status.last_reward, Some(RewardOutcome { coin: 10, xp: 20 }));

    let user = service.user(USER).unwrap();
    assert_eq!(user.mined_boss_coin, 110);
    assert_eq!(user.total_experience, 30);
}

#[tokio::test]
async fn failed_commit_can_be_retried() {
    let service = memory_service();
    let (_task, handle) = spawn(&service);
    handle.begin().await.unwrap();

    service.fail_commit(true);
    defeat_first_boss(&handle).await;

    let status = handle
        .wait_for_status(|s| !s.reconciling && s.last_error.is_some())
        .await
        .unwrap();
    assert_eq!(status.state, CombatState::Defeated);
    assert_eq!(status.bosses_defeated, 0);
    assert!(service.commits().is_empty());

    // No rotation happened, and a second defeat cannot be claimed
    assert_eq!(
        handle.strike().await.unwrap(),
        Err(StrikeRejected::AlreadyDefeated)
    );

    service.fail_commit(false);
    handle.retry().await.unwrap();
    let status = handle
        .wait_for_status(|s| s.bosses_defeated == 1 && s.state == CombatState::Engaging)
        .await
        .unwrap();

    assert_eq!(status.last_error, None);
    assert_eq!(status.state, CombatState::Engaging);
    assert_eq!(service.commits().len(), 1);
}

#[tokio::test]
async fn retry_restarts_a_failed_begin() {
    let service = memory_service();
    let (_task, handle) = spawn(&service);

    service.fail_catalog(true);
    assert!(handle.begin().await.is_err());
    let status = handle.status();
    assert_eq!(status.state, CombatState::Idle);
    assert!(status.last_error.is_some());

    service.fail_catalog(false);
    handle.retry().await.unwrap();
    let status = handle.status();
    assert_eq!(status.state, CombatState::Engaging);
    assert_eq!(status.last_error, None);
}

#[tokio::test]
async fn retry_while_engaging_is_refused() {
    let service = memory_service();
    let (_task, handle) = spawn(&service);
    handle.begin().await.unwrap();

    assert!(handle.retry().await.is_err());
    assert_eq!(handle.status().current_health, 60);
}

#[tokio::test]
async fn shutdown_with_reconciliation_in_flight_discards_the_report() {
    let service = memory_service();
    let (task, handle) = spawn(&service);
    handle.begin().await.unwrap();

    service.pause_commits();
    defeat_first_boss(&handle).await;
    handle.shutdown().await.unwrap();
    task.await.unwrap();

    assert!(handle.strike().await.is_err());
    assert_eq!(handle.status().bosses_defeated, 0);

    // The remote write still completes on its own
    service.resume_commits();
    tokio::task::yield_now().await;
    assert_eq!(handle.status().bosses_defeated, 0);
}

#[tokio::test]
async fn profile_reads_the_remote_record() {
    let service = memory_service();
    let (_task, handle) = spawn(&service);

    let profile = handle.profile().await.unwrap();
    assert_eq!(profile.attack_power, 30);
    assert_eq!(profile.mined_boss_coin, 100);

    service.fail_user_fetch(true);
    assert!(handle.profile().await.is_err());
}

#[tokio::test]
async fn selection_mode_can_be_switched() {
    let service = Arc::new(MemoryBossService::new(vec![boss("solo", 30, 1, 1)]));
    service.insert_user(
        USER,
        RemoteUserRecord {
            attack_power: 50,
            ..Default::default()
        },
    );
    let (_task, handle) = spawn(&service);

    handle.set_selection(SelectionMode::Random).await.unwrap();
    handle.begin().await.unwrap();
    assert!(handle.strike().await.unwrap().unwrap().defeated);

    // Single boss catalogs rotate back onto the same boss at full health
    let status = handle
        .wait_for_status(|s| s.bosses_defeated == 1 && s.state == CombatState::Engaging)
        .await
        .unwrap();
    assert_eq!(status.state, CombatState::Engaging);
    assert_eq!(status.current_health, 30);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn status_reflects_each_reply_before_it_returns() {
    for _ in 0..50 {
        let service = memory_service();
        let (_task, handle) = spawn(&service);

        handle.begin().await.unwrap();
        let status = handle.status();
        assert_eq!(status.state, CombatState::Engaging);
        assert_eq!(status.current_health, 60);

        service.pause_commits();
        assert!(!handle.strike().await.unwrap().unwrap().defeated);
        assert_eq!(handle.status().current_health, 30);

        assert!(handle.strike().await.unwrap().unwrap().defeated);
        let status = handle.status();
        assert_eq!(status.state, CombatState::Defeated);
        assert!(status.reconciling);

        service.resume_commits();
        handle
            .wait_for_status(|s| s.bosses_defeated == 1 && !s.reconciling)
            .await
            .unwrap();
        handle.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn abandon_moves_past_a_reward_that_never_commits() {
    let service = memory_service();
    let (_task, handle) = spawn(&service);
    handle.begin().await.unwrap();

    service.fail_commit(true);
    defeat_first_boss(&handle).await;
    handle
        .wait_for_status(|s| !s.reconciling && s.last_error.is_some())
        .await
        .unwrap();

    let boss = handle.abandon().await.unwrap();
    assert_eq!(boss.id, "b");

    let status = handle.status();
    assert_eq!(status.state, CombatState::Engaging);
    assert_eq!(status.boss.as_ref().map(|b| b.id.as_str()), Some("b"));
    assert_eq!(status.current_health, 90);
    assert_eq!(status.bosses_defeated, 0);
    assert_eq!(status.last_error, None);
    assert!(service.commits().is_empty());

    // The new boss takes strikes normally
    assert!(!handle.strike().await.unwrap().unwrap().defeated);
}

#[tokio::test]
async fn abandon_during_reconciliation_ignores_the_late_report() {
    let service = memory_service();
    let (_task, handle) = spawn(&service);
    handle.begin().await.unwrap();

    service.pause_commits();
    defeat_first_boss(&handle).await;
    assert!(handle.status().reconciling);

    handle.abandon().await.unwrap();
    assert!(!handle.strike().await.unwrap().unwrap().defeated);
    assert_eq!(handle.status().current_health, 60);

    // Let the abandoned commit land, then make sure nothing reached the new boss
    service.resume_commits();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let status = handle.status();
    assert_eq!(status.state, CombatState::Engaging);
    assert_eq!(status.boss.as_ref().map(|b| b.id.as_str()), Some("b"));
    assert_eq!(status.current_health, 60);
    assert_eq!(status.bosses_defeated, 0);
}

#[tokio::test]
async fn service_stops_once_every_handle_is_dropped() {
    let service = memory_service();
    let (task, handle) = spawn(&service);
    handle.begin().await.unwrap();

    let clone = handle.clone();
    drop(handle);
    assert!(clone.strike().await.unwrap().is_ok());
    drop(clone);

    let finished = tokio::time::timeout(Duration::from_secs(5), task).await;
    assert!(matches!(finished, Ok(Ok(()))));
}
