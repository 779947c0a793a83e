//! Terminal front end for pullload
//!
//! [`ListHost`] is a scroll host measured in cells, [`PullLoadView`] the
//! default sentinel with a ratatui renderer, [`PullGesture`] maps crossterm
//! input onto the host and [`LoadRunner`] moves load work onto tokio while
//! keeping completions on the UI thread.

pub mod host;
pub mod input;
pub mod runner;
pub mod widgets;

pub use host::ListHost;
pub use input::{GestureAction, PullGesture};
pub use runner::{LoadOutcome, LoadRunner};
pub use widgets::{PullLoadView, SentinelWidget};

use pullload_core::PullLoadConfig;

/// Pulling headroom in cells
pub const TERMINAL_MARGIN: f64 = 1.0;

/// Defaults scaled for cell units
pub fn terminal_config() -> PullLoadConfig {
    PullLoadConfig {
        margin: TERMINAL_MARGIN,
        ..PullLoadConfig::default()
    }
}
