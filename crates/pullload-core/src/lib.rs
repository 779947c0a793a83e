//! Pull-to-refresh and load-more sentinels for scroll containers
//!
//! ## L4 Atomic Layer
//! - `geometry` - Edges, axes and edge distances
//! - `animation` - Easing, timing and inset animation
//! - `config` - Tunables loaded from TOML
//!
//! ## L3 Molecular Layer
//! - `host` - Host contract, change notifications, in-memory host
//! - `state` - Pull state, completion and sentinel capability
//! - `layout` - Sentinel placement and inset reservation
//! - `loader` - State machine for one sentinel
//!
//! ## L2 Organism Layer
//! - `registry` - Attachment registry

pub mod animation;
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod layout;
pub mod loader;
pub mod registry;
pub mod state;

pub use config::{EasingType, PullLoadConfig, TriggerPolicy};
pub use error::{Error, Result};
pub use geometry::{Axis, Edge, Insets, Point, Rect, Size};
pub use host::{AttachmentId, ChangeNotifier, HostChange, HostId, MemoryHost, ScrollHost, Subscription};
pub use layout::SentinelFrame;
pub use loader::{PullLoader, SharedHost, SharedLoader};
pub use registry::{AttachmentHandle, PullLoaderRegistry};
pub use state::{Completion, PullLoadable, PullState};
