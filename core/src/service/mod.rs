//! Encounter service - runs one encounter behind a command channel
//!
//! Architecture:
//! - SharedState: status published through a watch channel, readable by handles
//! - EncounterHandle: for sending commands + reading the latest status
//! - EncounterService: background task that owns the encounter and applies commands
//!
//! Reconciliation for a defeat runs in a spawned task and reports back through
//! the command channel. Until the report arrives, strikes are rejected with
//! `Reconciling`, so they can never land on the next boss.
mod handle;
mod state;

#[cfg(test)]
mod service_tests;

pub use handle::EncounterHandle;
pub use state::{EncounterStatus, SharedState};

use std::sync::Arc;

use bossrush_types::SelectionMode;
use rand::Rng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::BossEntity;
use crate::combat::{CombatState, StrikeRejected, StrikeResult};
use crate::encounter::{Encounter, ResolutionReport, Rotation, SessionError, run_resolution};
use crate::remote::{BossService, RemoteUserRecord};

const COMMAND_BUFFER: usize = 32;

/// Reply to a strike command
pub type StrikeReply = Result<StrikeResult, StrikeRejected>;

// ─────────────────────────────────────────────────────────────────────────────
// Service Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Messages sent to the service from handles (and from its own resolution task)
pub enum EncounterCommand {
    Begin(oneshot::Sender<Result<BossEntity, String>>),
    Strike(oneshot::Sender<StrikeReply>),
    /// Retry whatever step last failed: reconciliation if a defeat is pending,
    /// otherwise starting an encounter
    Retry(oneshot::Sender<Result<(), String>>),
    /// Give up on the current boss (and any uncommitted reward) and rotate
    Abandon(oneshot::Sender<Result<BossEntity, String>>),
    Profile(oneshot::Sender<Result<RemoteUserRecord, String>>),
    SetSelection(SelectionMode),
    Shutdown,
    ResolutionFinished(ResolutionReport),
}

// ─────────────────────────────────────────────────────────────────────────────
// Encounter Service
// ─────────────────────────────────────────────────────────────────────────────

pub struct EncounterService<S, R = StdRng> {
    encounter: Encounter<S, R>,
    shared: Arc<SharedState>,
    cmd_rx: mpsc::Receiver<EncounterCommand>,
    /// Weak so the loop ends once every handle is gone; a resolution task
    /// holds a strong clone only while it runs
    cmd_tx: mpsc::WeakSender<EncounterCommand>,
    resolution_handle: Option<JoinHandle<()>>,
}

impl<S, R> EncounterService<S, R>
where
    S: BossService + 'static,
    R: Rng + Send + 'static,
{
    /// Create a new service and return a handle to communicate with it
    pub fn new(encounter: Encounter<S, R>) -> (Self, EncounterHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let shared = Arc::new(SharedState::new());
        shared.publish(&encounter);

        let service = Self {
            encounter,
            shared: shared.clone(),
            cmd_rx,
            cmd_tx: cmd_tx.downgrade(),
            resolution_handle: None,
        };
        let handle = EncounterHandle::new(cmd_tx, shared);
        (service, handle)
    }

    /// Spawn the service on the current runtime
    pub fn spawn(encounter: Encounter<S, R>) -> (JoinHandle<()>, EncounterHandle) {
        let (service, handle) = Self::new(encounter);
        (tokio::spawn(service.run()), handle)
    }

    /// Run the service event loop until `Shutdown` or until every handle is dropped.
    ///
    /// Status is published before a command is answered, so a caller that
    /// reads the status after a reply always sees that command's effect.
    pub async fn run(mut self) {
        while let Some(cmd) = self.cmd_rx.recv().await {
            match cmd {
                EncounterCommand::Begin(reply) => {
                    let result = self.begin().await;
                    self.reply(reply, result);
                }
                EncounterCommand::Strike(reply) => {
                    let result = self.strike();
                    self.reply(reply, result);
                }
                EncounterCommand::Retry(reply) => {
                    let result = self.retry().await;
                    self.reply(reply, result);
                }
                EncounterCommand::Abandon(reply) => {
                    let result = self.abandon().await;
                    self.reply(reply, result);
                }
                EncounterCommand::Profile(reply) => {
                    self.fetch_profile(reply);
                }
                EncounterCommand::SetSelection(mode) => {
                    debug!(mode = mode.label(), "selection mode changed");
                    self.encounter.set_selection(mode);
                    self.shared.publish(&self.encounter);
                }
                EncounterCommand::ResolutionFinished(report) => {
                    self.finish_resolution(report);
                    self.shared.publish(&self.encounter);
                }
                EncounterCommand::Shutdown => {
                    break;
                }
            }
        }

        // An in-flight resolution is left to finish; its report has nowhere to go
        if let Some(handle) = self.resolution_handle.take()
            && !handle.is_finished()
        {
            info!("encounter service stopping with reconciliation in flight; result will be discarded");
        }
        info!("encounter service stopped");
    }

    fn reply<T>(&self, reply: oneshot::Sender<T>, value: T) {
        self.shared.publish(&self.encounter);
        let _ = reply.send(value);
    }

    async fn begin(&mut self) -> Result<BossEntity, String> {
        let result = self.encounter.begin().await.map_err(|e| e.describe());
        self.shared.record_error(result.as_ref().err().cloned());
        result
    }

    fn strike(&mut self) -> StrikeReply {
        let result = self.encounter.strike()?;
        if result.defeated {
            self.start_resolution();
        }
        Ok(result)
    }

    async fn retry(&mut self) -> Result<(), String> {
        let controller = self.encounter.controller();
        let (state, reconciling, rewarded) = (
            controller.state(),
            controller.is_reconciling(),
            controller.is_rewarded(),
        );
        match state {
            CombatState::Defeated if reconciling => {
                Err("reconciliation already in flight".to_string())
            }
            CombatState::Defeated if !rewarded => {
                self.start_resolution();
                Ok(())
            }
            CombatState::Engaging => Err("encounter already in progress".to_string()),
            CombatState::Idle | CombatState::Defeated => self.begin().await.map(|_| ()),
        }
    }

    /// Drop the current boss and rotate. An in-flight reconciliation keeps
    /// running remotely, but its report no longer matches and is discarded.
    async fn abandon(&mut self) -> Result<BossEntity, String> {
        let result = self
            .encounter
            .abandon_and_rotate()
            .await
            .map_err(|e| e.describe());
        self.shared.record_error(result.as_ref().err().cloned());
        result
    }

    fn start_resolution(&mut self) {
        let Some(cmd_tx) = self.cmd_tx.upgrade() else {
            warn!("no handles left; not reconciling");
            return;
        };
        let ticket = match self.encounter.begin_resolution() {
            Ok(ticket) => ticket,
            Err(e) => {
                warn!(error = %e, "cannot start reconciliation");
                return;
            }
        };

        info!(boss_id = %ticket.boss.id, "reconciling reward");
        let service = self.encounter.service().clone();
        let handle = tokio::spawn(async move {
            let report = run_resolution(service.as_ref(), ticket).await;
            if cmd_tx
                .send(EncounterCommand::ResolutionFinished(report))
                .await
                .is_err()
            {
                debug!("encounter service gone; discarding resolution report");
            }
        });
        self.resolution_handle = Some(handle);
    }

    fn finish_resolution(&mut self, report: ResolutionReport) {
        let result = self.encounter.complete_resolution(report);
        if let Err(SessionError::StaleResolution) = result {
            // A newer resolution may still be running; leave its handle alone
            return;
        }

        self.resolution_handle = None;
        match result {
            Ok(resolution) => {
                self.shared.record_reward(resolution.reward);
                let error = match &resolution.rotation {
                    Rotation::Failed(e) => Some(e.describe()),
                    Rotation::Started(_) | Rotation::NoEncounterAvailable => None,
                };
                self.shared.record_error(error);
            }
            Err(e) => {
                self.shared.record_error(Some(e.describe()));
            }
        }
    }

    fn fetch_profile(&self, reply: oneshot::Sender<Result<RemoteUserRecord, String>>) {
        let service = self.encounter.service().clone();
        let user_id = self.encounter.controller().user_id().to_string();
        tokio::spawn(async move {
            let result = service
                .fetch_user(&user_id)
                .await
                .map_err(|e| e.to_string());
            let _ = reply.send(result);
        });
    }
}
