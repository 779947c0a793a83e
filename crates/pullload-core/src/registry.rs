//! Attachment registry
//!
//! Binds sentinels to hosts, one per (host, edge). Attaching a second
//! sentinel on an occupied edge replaces the first: the old one is fully
//! detached (inset restored, subscription dropped, view removed) before the
//! new one is set up.
//!
//! Hosts are referenced weakly. Call [`PullLoaderRegistry::dispatch`] after
//! host changes and [`PullLoaderRegistry::tick`] once per frame while
//! [`PullLoaderRegistry::needs_tick`] is true. Neither may run while the
//! caller holds a borrow of a host.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use tracing::debug;

use crate::config::PullLoadConfig;
use crate::geometry::Edge;
use crate::host::{AttachmentId, HostId, ScrollHost};
use crate::layout::SentinelFrame;
use crate::loader::{PullLoader, SharedHost, SharedLoader};
use crate::state::{PullLoadable, PullState};

/// Reference to one attached sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentHandle {
    pub id: AttachmentId,
    pub host: HostId,
    pub edge: Edge,
}

pub struct PullLoaderRegistry {
    config: PullLoadConfig,
    loaders: Vec<SharedLoader>,
}

impl Default for PullLoaderRegistry {
    fn default() -> Self {
        Self::new(PullLoadConfig::default())
    }
}

impl PullLoaderRegistry {
    pub fn new(config: PullLoadConfig) -> Self {
        Self {
            config,
            loaders: Vec::new(),
        }
    }

    pub fn config(&self) -> &PullLoadConfig {
        &self.config
    }

    /// Replace the configuration for current and future attachments
    pub fn set_config(&mut self, config: PullLoadConfig) {
        for loader in &self.loaders {
            loader.borrow_mut().set_config(config.clone());
        }
        self.config = config;
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Attach `view` to `edge` of `host`
    pub fn attach<H, V>(&mut self, host: &Rc<RefCell<H>>, view: V, edge: Edge) -> AttachmentHandle
    where
        H: ScrollHost + 'static,
        V: PullLoadable + 'static,
    {
        let shared: SharedHost = host.clone();
        self.attach_shared(&shared, Box::new(view), edge)
    }

    /// Attach a boxed view to a type-erased host
    pub fn attach_shared(
        &mut self,
        host: &SharedHost,
        view: Box<dyn PullLoadable>,
        edge: Edge,
    ) -> AttachmentHandle {
        let host_id = host.borrow().host_id();
        if let Some(existing) = self.find(host_id, edge) {
            debug!("{}: replacing {} on {:?} edge", host_id, existing.id, edge);
            self.detach(existing);
        }

        let loader = PullLoader::new_shared(host, host_id, view, edge, self.config.clone());
        loader.borrow_mut().set_up();
        let id = loader.borrow().id();
        debug!("{}: attached {} on {:?} edge", host_id, id, edge);
        self.loaders.push(loader);

        AttachmentHandle {
            id,
            host: host_id,
            edge,
        }
    }

    /// Remove a sentinel; returns whether anything was attached
    pub fn detach(&mut self, handle: AttachmentHandle) -> bool {
        let Some(index) = self.position(handle.id) else {
            return false;
        };
        let loader = self.loaders.remove(index);
        loader.borrow_mut().tear_down();
        debug!("{}: detached {}", handle.host, handle.id);
        true
    }

    /// Remove whatever sentinel sits on `edge` of `host`
    pub fn detach_edge(&mut self, host: HostId, edge: Edge) -> bool {
        match self.find(host, edge) {
            Some(handle) => self.detach(handle),
            None => false,
        }
    }

    /// Remove every sentinel of `host`; returns how many were removed
    pub fn detach_host(&mut self, host: HostId) -> usize {
        let handles: Vec<_> = self.handles().filter(|h| h.host == host).collect();
        handles.into_iter().filter(|h| self.detach(*h)).count()
    }

    pub fn find(&self, host: HostId, edge: Edge) -> Option<AttachmentHandle> {
        self.handles().find(|h| h.host == host && h.edge == edge)
    }

    pub fn handles(&self) -> impl Iterator<Item = AttachmentHandle> + '_ {
        self.loaders.iter().map(|loader| {
            let loader = loader.borrow();
            AttachmentHandle {
                id: loader.id(),
                host: loader.host_id(),
                edge: loader.edge(),
            }
        })
    }

    /// Loader behind a handle, for callers that need direct access
    pub fn loader(&self, handle: AttachmentHandle) -> Option<SharedLoader> {
        self.position(handle.id).map(|i| self.loaders[i].clone())
    }

    /// Programmatic pull to refresh on the leading edge of `host`
    ///
    /// Returns whether the sentinel is loading afterwards.
    pub fn force_pull(&mut self, host: HostId) -> bool {
        let Some(handle) = self.find(host, Edge::Leading) else {
            return false;
        };
        self.with_loader(handle, |loader| {
            loader.start_loading(true);
            loader.state().is_loading()
        })
        .unwrap_or(false)
    }

    /// End loading for a sentinel without going through its completion
    pub fn end_loading(&mut self, handle: AttachmentHandle) {
        self.with_loader(handle, |loader| loader.end_loading());
    }

    /// Current state, or `Idle` for unknown handles
    pub fn state(&self, handle: AttachmentHandle) -> PullState {
        self.peek(handle, |loader| loader.state().clone())
            .unwrap_or_default()
    }

    pub fn frame(&self, handle: AttachmentHandle) -> Option<SentinelFrame> {
        self.peek(handle, |loader| loader.frame()).flatten()
    }

    pub fn reserved_inset(&self, handle: AttachmentHandle) -> f64 {
        self.peek(handle, |loader| loader.reserved_inset())
            .unwrap_or(0.0)
    }

    pub fn is_hidden(&self, handle: AttachmentHandle) -> bool {
        self.peek(handle, |loader| loader.is_hidden())
            .unwrap_or(true)
    }

    /// Forward queued host changes into every state machine
    ///
    /// Attachments whose host has been dropped are removed.
    pub fn dispatch(&mut self) {
        self.prune();
        for loader in &self.loaders {
            loader.borrow_mut().process_changes();
        }
    }

    /// Advance inset animations; returns whether any is still running
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut running = false;
        for loader in &self.loaders {
            running |= loader.borrow_mut().tick(now);
        }
        running
    }

    pub fn needs_tick(&self) -> bool {
        self.loaders
            .iter()
            .any(|loader| loader.try_borrow().map(|l| l.is_animating()).unwrap_or(false))
    }

    fn prune(&mut self) {
        self.loaders.retain(|loader| {
            let alive = loader.borrow().is_host_alive();
            if !alive {
                debug!("{}: host dropped, removing attachment", loader.borrow().id());
            }
            alive
        });
    }

    fn position(&self, id: AttachmentId) -> Option<usize> {
        self.loaders.iter().position(|l| l.borrow().id() == id)
    }

    fn with_loader<R>(&self, handle: AttachmentHandle, f: impl FnOnce(&mut PullLoader) -> R) -> Option<R> {
        let index = self.position(handle.id)?;
        let mut loader = self.loaders[index].try_borrow_mut().ok()?;
        Some(f(&mut loader))
    }

    fn peek<R>(&self, handle: AttachmentHandle, f: impl FnOnce(&PullLoader) -> R) -> Option<R> {
        let index = self.position(handle.id)?;
        let loader = self.loaders[index].try_borrow().ok()?;
        Some(f(&loader))
    }
}

impl Drop for PullLoaderRegistry {
    fn drop(&mut self) {
        for loader in self.loaders.drain(..) {
            if let Ok(mut loader) = loader.try_borrow_mut() {
                loader.tear_down();
            }
        }
    }
}
