mod app;
mod effects;
pub mod ui;

pub use app::{run_once, run_shell};
