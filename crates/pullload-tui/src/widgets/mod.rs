mod pull_load_view;
mod sentinel;

pub use pull_load_view::{default_message, Delegate, Indicator, PullLoadView, DEFAULT_EXTENT};
pub use sentinel::{project, SentinelWidget};
