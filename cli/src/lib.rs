pub mod commands;
pub mod context;
pub mod logging;
pub mod presenter;
pub mod repl;

pub use context::CliContext;
pub use presenter::ConsolePresenter;
pub use repl::readline;
