//! Encounter orchestration
//!
//! Ties the catalog, combat controller and reward reconciliation together:
//! begin → strike* → [defeat] → reconcile → rotate → strike* ...
//!
//! Remote work for a defeat is split in two so it can also run off-task:
//! [`run_resolution`] performs the network calls, [`Encounter::complete_resolution`]
//! applies the report to the session.
mod error;
mod handler;
mod signal;


pub use error::SessionError;
pub use handler::SignalHandler;
pub use signal::EncounterSignal;

use std::sync::Arc;

use bossrush_types::SelectionMode;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::catalog::{self, BossEntity};
use crate::combat::{
    CombatController, CombatSession, CombatState, DefeatTicket, StrikeRejected, StrikeResult,
};
use crate::remote::{BossService, RewardTotals};
use crate::reward::{self, Reconciliation, RewardOutcome};

// ─────────────────────────────────────────────────────────────────────────────
// Resolution Types
// ─────────────────────────────────────────────────────────────────────────────

/// Network results for one defeat, produced by [`run_resolution`]
#[derive(Debug)]
pub struct ResolutionReport {
    pub ticket: DefeatTicket,
    pub reconciliation: Result<Reconciliation, SessionError>,
    /// Catalog for the next encounter; only fetched after a successful commit
    pub catalog: Option<Result<Vec<BossEntity>, SessionError>>,
}

/// What happened after the reward was committed
#[derive(Debug)]
pub enum Rotation {
    Started(BossEntity),
    NoEncounterAvailable,
    Failed(SessionError),
}

/// A committed reward plus the rotation that followed it
#[derive(Debug)]
pub struct Resolution {
    pub reward: RewardOutcome,
    pub committed: RewardTotals,
    pub rotation: Rotation,
}

/// Reconcile the reward for `ticket`, then fetch the catalog for rotation.
///
/// The catalog is not requested when reconciliation fails, since rotation
/// must not proceed in that case.
pub async fn run_resolution<S: BossService>(service: &S, ticket: DefeatTicket) -> ResolutionReport {
    let reconciliation = reward::reconcile(service, &ticket).await;
    let catalog = match reconciliation {
        Ok(_) => Some(catalog::list_bosses(service).await),
        Err(_) => None,
    };
    ResolutionReport {
        ticket,
        reconciliation,
        catalog,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Encounter
// ─────────────────────────────────────────────────────────────────────────────

/// One player's boss rush: the live combat session plus everything needed to
/// move from one boss to the next.
pub struct Encounter<S, R = StdRng> {
    service: Arc<S>,
    controller: CombatController,
    selection: SelectionMode,
    rng: R,
    previous_boss: Option<String>,
    handlers: Vec<Box<dyn SignalHandler>>,
}

impl<S: BossService> Encounter<S, StdRng> {
    pub fn new(service: Arc<S>, user_id: impl Into<String>, selection: SelectionMode) -> Self {
        Self::with_rng(service, user_id, selection, StdRng::from_entropy())
    }
}

impl<S: BossService, R: Rng + Send> Encounter<S, R> {
    pub fn with_rng(
        service: Arc<S>,
        user_id: impl Into<String>,
        selection: SelectionMode,
        rng: R,
    ) -> Self {
        Self {
            service,
            controller: CombatController::new(user_id),
            selection,
            rng,
            previous_boss: None,
            handlers: Vec::new(),
        }
    }

    pub fn add_signal_handler(&mut self, handler: Box<dyn SignalHandler>) {
        self.handlers.push(handler);
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    pub fn controller(&self) -> &CombatController {
        &self.controller
    }

    pub fn state(&self) -> CombatState {
        self.controller.state()
    }

    pub fn session(&self) -> Option<&CombatSession> {
        self.controller.session()
    }

    pub fn selection(&self) -> SelectionMode {
        self.selection
    }

    pub fn set_selection(&mut self, selection: SelectionMode) {
        self.selection = selection;
    }

    /// Load the user's attack power and the catalog, then engage a boss.
    ///
    /// On failure the session stays Idle (or where it was) and `begin` can be
    /// called again. An empty catalog signals `NoEncounterAvailable`.
    pub async fn begin(&mut self) -> Result<BossEntity, SessionError> {
        if self.controller.user_id().trim().is_empty() {
            return Err(SessionError::NoUser);
        }
        if self.controller.is_reconciling() {
            return Err(SessionError::ReconciliationInFlight);
        }
        if self.controller.state() == CombatState::Defeated && !self.controller.is_rewarded() {
            return Err(SessionError::RewardPending);
        }

        let snapshot = match self.service.fetch_user(self.controller.user_id()).await {
            Ok(snapshot) => snapshot,
            Err(source) => {
                let err = SessionError::UserFetchFailed(source);
                self.report_failure(&err);
                return Err(err);
            }
        };
        self.controller.set_attack_power(snapshot.attack_power);

        let bosses = match catalog::list_bosses(self.service.as_ref()).await {
            Ok(bosses) => bosses,
            Err(err) => {
                self.report_failure(&err);
                return Err(err);
            }
        };

        match self.rotate(&bosses) {
            Rotation::Started(boss) => Ok(boss),
            Rotation::NoEncounterAvailable => Err(SessionError::EmptyCatalog),
            Rotation::Failed(err) => Err(err),
        }
    }

    /// Strike the active boss.
    ///
    /// On `defeated` the caller should follow up with [`Encounter::resolve_defeat`].
    pub fn strike(&mut self) -> Result<StrikeResult, StrikeRejected> {
        let result = self.controller.strike()?;
        self.emit(EncounterSignal::StrikeAnimationRequested);
        self.emit(EncounterSignal::HealthChanged {
            current: result.new_health,
            max: result.max_health,
        });
        Ok(result)
    }

    /// Reconcile the defeated boss's reward and rotate to the next boss.
    ///
    /// Safe to call again after a `ReconciliationFailed`.
    pub async fn resolve_defeat(&mut self) -> Result<Resolution, SessionError> {
        let ticket = self.begin_resolution()?;
        let report = run_resolution(self.service.as_ref(), ticket).await;
        self.complete_resolution(report)
    }

    /// Claim the defeat for an off-task [`run_resolution`].
    pub fn begin_resolution(&mut self) -> Result<DefeatTicket, SessionError> {
        self.controller.begin_reconciliation()
    }

    /// Apply a finished [`run_resolution`] report.
    ///
    /// A report whose ticket no longer matches the live defeat (the encounter
    /// was abandoned or restarted meanwhile) is discarded with `StaleResolution`.
    pub fn complete_resolution(
        &mut self,
        report: ResolutionReport,
    ) -> Result<Resolution, SessionError> {
        if !self.controller.holds_ticket(&report.ticket) {
            warn!(
                boss_id = %report.ticket.boss.id,
                generation = report.ticket.generation,
                "discarding resolution for an abandoned encounter"
            );
            return Err(SessionError::StaleResolution);
        }

        let reconciliation = match report.reconciliation {
            Ok(reconciliation) => reconciliation,
            Err(err) => {
                self.controller.abandon_reconciliation();
                self.report_failure(&err);
                return Err(err);
            }
        };

        self.controller
            .finish_reconciliation(reconciliation.attack_power);
        self.emit(EncounterSignal::Defeated {
            boss: report.ticket.boss,
            reward: reconciliation.reward,
        });

        let rotation = match report.catalog {
            Some(Ok(bosses)) => self.rotate(&bosses),
            Some(Err(err)) => {
                self.controller.clear();
                self.report_failure(&err);
                Rotation::Failed(err)
            }
            None => {
                self.controller.clear();
                Rotation::Failed(SessionError::EmptyCatalog)
            }
        };

        Ok(Resolution {
            reward: reconciliation.reward,
            committed: reconciliation.committed,
            rotation,
        })
    }

    /// Drop the current session, abandoning any unrewarded defeat.
    ///
    /// An outstanding ticket is invalidated, so a late report for it is
    /// discarded by [`Encounter::complete_resolution`].
    pub fn abandon(&mut self) {
        if self.controller.state() == CombatState::Defeated && !self.controller.is_rewarded() {
            warn!(
                reconciling = self.controller.is_reconciling(),
                "abandoning defeated boss without committing its reward"
            );
        }
        self.controller.clear();
    }

    /// Abandon the current session and rotate straight to the next boss.
    pub async fn abandon_and_rotate(&mut self) -> Result<BossEntity, SessionError> {
        self.abandon();
        self.begin().await
    }

    fn rotate(&mut self, bosses: &[BossEntity]) -> Rotation {
        let next = catalog::select(
            self.selection,
            bosses,
            self.previous_boss.as_deref(),
            &mut self.rng,
        );

        let boss = match next {
            Ok(boss) => boss,
            Err(SessionError::EmptyCatalog) => {
                info!("no encounter available");
                self.controller.clear();
                self.emit(EncounterSignal::NoEncounterAvailable);
                return Rotation::NoEncounterAvailable;
            }
            Err(err) => {
                self.controller.clear();
                return Rotation::Failed(err);
            }
        };

        let attack_power = self.controller.attack_power();
        if let Err(err) = self.controller.start(boss.clone(), attack_power) {
            self.report_failure(&err);
            return Rotation::Failed(err);
        }

        self.previous_boss = Some(boss.id.clone());
        self.emit(EncounterSignal::EncounterStarted { boss: boss.clone() });
        self.emit(EncounterSignal::HealthChanged {
            current: boss.max_health,
            max: boss.max_health,
        });
        Rotation::Started(boss)
    }

    fn report_failure(&mut self, err: &SessionError) {
        warn!(error = %err.describe(), state = self.controller.state().label(), "encounter step failed");
        self.emit(EncounterSignal::ResolutionFailed {
            reason: err.describe(),
        });
    }

    fn emit(&mut self, signal: EncounterSignal) {
        for handler in &mut self.handlers {
            handler.handle_signal(&signal);
        }
    }
}
