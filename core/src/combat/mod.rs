//! Combat session and its state machine
mod controller;
mod session;


pub use controller::{CombatController, CombatState, DefeatTicket, StrikeRejected, StrikeResult};
pub use session::CombatSession;
