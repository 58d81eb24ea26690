use std::sync::Arc;

use bossrush_types::SelectionMode;
use tokio::sync::{mpsc, oneshot};

use super::{EncounterCommand, EncounterStatus, SharedState, StrikeReply};
use crate::catalog::BossEntity;
use crate::remote::RemoteUserRecord;

const SERVICE_STOPPED: &str = "encounter service stopped";

// ─────────────────────────────────────────────────────────────────────────────
// Encounter Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to communicate with the encounter service and query its status
#[derive(Clone)]
pub struct EncounterHandle {
    cmd_tx: mpsc::Sender<EncounterCommand>,
    shared: Arc<SharedState>,
}

impl EncounterHandle {
    pub(crate) fn new(cmd_tx: mpsc::Sender<EncounterCommand>, shared: Arc<SharedState>) -> Self {
        Self { cmd_tx, shared }
    }

    /// Load attack power and catalog, then engage a boss
    pub async fn begin(&self) -> Result<BossEntity, String> {
        self.request(EncounterCommand::Begin).await?
    }

    /// Strike the active boss. A rejected strike is reported, never queued.
    pub async fn strike(&self) -> Result<StrikeReply, String> {
        self.request(EncounterCommand::Strike).await
    }

    /// Retry the last failed step
    pub async fn retry(&self) -> Result<(), String> {
        self.request(EncounterCommand::Retry).await?
    }

    /// Give up on the current boss, including a reward that will not commit,
    /// and engage the next one
    pub async fn abandon(&self) -> Result<BossEntity, String> {
        self.request(EncounterCommand::Abandon).await?
    }

    /// Fetch the remote user record (attack power, totals, profile)
    pub async fn profile(&self) -> Result<RemoteUserRecord, String> {
        self.request(EncounterCommand::Profile).await?
    }

    pub async fn set_selection(&self, mode: SelectionMode) -> Result<(), String> {
        self.send(EncounterCommand::SetSelection(mode)).await
    }

    /// Stop the service. An in-flight reconciliation finishes remotely but
    /// its result is discarded.
    pub async fn shutdown(&self) -> Result<(), String> {
        self.send(EncounterCommand::Shutdown).await
    }

    /// Latest published status
    pub fn status(&self) -> EncounterStatus {
        self.shared.status.borrow().clone()
    }

    /// Wait until the published status satisfies `predicate`
    pub async fn wait_for_status(
        &self,
        mut predicate: impl FnMut(&EncounterStatus) -> bool,
    ) -> Result<EncounterStatus, String> {
        let mut rx = self.shared.status.subscribe();
        let status = rx
            .wait_for(|status| predicate(status))
            .await
            .map_err(|e| e.to_string())?
            .clone();
        Ok(status)
    }

    async fn send(&self, cmd: EncounterCommand) -> Result<(), String> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SERVICE_STOPPED.to_string())
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> EncounterCommand,
    ) -> Result<T, String> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(make(reply_tx)).await?;
        reply_rx.await.map_err(|_| SERVICE_STOPPED.to_string())
    }
}
