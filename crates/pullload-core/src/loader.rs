//! L3 Molecular Layer: Pull/load state machine for one sentinel
//!
//! A [`PullLoader`] lives behind `Rc<RefCell<_>>` so its [`Completion`] can
//! reach back into it. Host access always goes through a `Weak` handle;
//! a dropped host or a host that is currently borrowed elsewhere turns the
//! operation into a no-op (or, for inset release, a retry on the next
//! flush).

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::animation::{InsetAnimation, InsetPhase};
use crate::config::PullLoadConfig;
use crate::geometry::{edge_distance, set_edge_distance, Edge};
use crate::host::{AttachmentId, HostChange, HostId, ScrollHost, Subscription};
use crate::layout::{is_content_short, sentinel_rect, InsetReservation, SentinelFrame};
use crate::state::{Completion, PullLoadable, PullState};

pub type SharedHost = Rc<RefCell<dyn ScrollHost>>;
pub type SharedLoader = Rc<RefCell<PullLoader>>;

/// State machine, layout and inset bookkeeping for one sentinel
pub struct PullLoader {
    id: AttachmentId,
    edge: Edge,
    host_id: HostId,
    host: Weak<RefCell<dyn ScrollHost>>,
    view: Box<dyn PullLoadable>,
    config: PullLoadConfig,
    state: PullState,
    subscription: Option<Subscription>,
    reservation: InsetReservation,
    animation: Option<InsetAnimation>,
    hidden: bool,
    frame: Option<SentinelFrame>,
    /// Bumped on every loading entry; stale completions compare against it
    cycle: u64,
    /// Completion invoked while this loader was borrowed
    pending_end: Rc<Cell<Option<u64>>>,
    /// Inset release that could not borrow the host
    release_pending: bool,
    /// Host changes were dropped while the host was busy
    needs_resync: bool,
    this: Weak<RefCell<PullLoader>>,
}

impl PullLoader {
    /// Create a loader bound to `host`; call [`PullLoader::set_up`] next
    pub fn new_shared(
        host: &SharedHost,
        host_id: HostId,
        view: Box<dyn PullLoadable>,
        edge: Edge,
        config: PullLoadConfig,
    ) -> SharedLoader {
        let host = Rc::downgrade(host);
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                id: AttachmentId::new(),
                edge,
                host_id,
                host,
                view,
                config,
                state: PullState::Idle,
                subscription: None,
                reservation: InsetReservation::default(),
                animation: None,
                hidden: false,
                frame: None,
                cycle: 0,
                pending_end: Rc::new(Cell::new(None)),
                release_pending: false,
                needs_resync: false,
                this: this.clone(),
            })
        })
    }

    pub fn id(&self) -> AttachmentId {
        self.id
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn host_id(&self) -> HostId {
        self.host_id
    }

    pub fn state(&self) -> &PullState {
        &self.state
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn frame(&self) -> Option<SentinelFrame> {
        self.frame
    }

    /// Inset currently added to the host for this sentinel
    pub fn reserved_inset(&self) -> f64 {
        self.reservation.reserved()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_host_alive(&self) -> bool {
        self.host.strong_count() > 0
    }

    pub fn config(&self) -> &PullLoadConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PullLoadConfig) {
        self.config = config;
    }

    /// Subscribe to the host, enter its render tree and run the first layout
    pub fn set_up(&mut self) {
        let Some(shared) = self.host.upgrade() else {
            return;
        };
        let Ok(mut host) = shared.try_borrow_mut() else {
            warn!("{}: host busy during set up", self.id);
            return;
        };
        self.subscription = Some(host.notifier().subscribe());
        host.insert_sentinel(self.id, self.edge);
        self.check_content_size(&mut *host);
    }

    /// Undo everything [`PullLoader::set_up`] and loading did to the host
    pub fn tear_down(&mut self) {
        self.subscription = None;
        self.animation = None;
        self.release_pending = false;
        self.needs_resync = false;
        self.pending_end.set(None);
        // Invalidate completions still held by the caller.
        self.cycle += 1;

        if let Some(shared) = self.host.upgrade() {
            match shared.try_borrow_mut() {
                Ok(mut host) => {
                    if let Some(target) = self.reservation.restore_target(self.edge) {
                        self.write_inset(&mut *host, target);
                    }
                    host.remove_sentinel(self.id);
                }
                Err(_) => warn!("{}: host busy during tear down, inset not restored", self.id),
            };
        }
        self.reservation.release();
        self.set_state(PullState::Idle);
    }

    /// Recompute the state from the host's current position
    pub fn update(&mut self) {
        let Some(shared) = self.host.upgrade() else {
            self.set_state(PullState::Idle);
            return;
        };
        {
            let Ok(mut host) = shared.try_borrow_mut() else {
                trace!("{}: host busy, update skipped", self.id);
                return;
            };
            self.update_with(&mut *host);
        }
        self.flush_pending();
    }

    /// Enter loading without a gesture
    ///
    /// With `force`, a leading sentinel that is not already loading goes
    /// straight to [`PullState::Loading`] and scrolls so the indicator is
    /// visible. Without it, only a loading state lacking its inset gets one.
    /// Trailing sentinels cannot be forced.
    pub fn start_loading(&mut self, force: bool) {
        let Some(shared) = self.host.upgrade() else {
            return;
        };
        {
            let Ok(mut host) = shared.try_borrow_mut() else {
                trace!("{}: host busy, start skipped", self.id);
                return;
            };
            self.start_loading_with(&mut *host, force);
        }
        self.flush_pending();
    }

    /// Leave loading and give the reserved inset back
    pub fn end_loading(&mut self) {
        if !self.state.is_loading() {
            return;
        }
        debug!("{}: loading finished on {:?} edge", self.id, self.edge);
        self.set_state(PullState::Idle);
        self.release_inset();
    }

    /// Apply every host change queued since the last call
    ///
    /// Changes that arrive while the host is borrowed elsewhere are not
    /// replayed one by one; the next call re-reads size and position instead.
    pub fn process_changes(&mut self) {
        let changes = match self.subscription.as_mut() {
            Some(subscription) => subscription.drain(),
            None => return,
        };
        if !changes.is_empty() || self.needs_resync {
            let Some(shared) = self.host.upgrade() else {
                self.set_state(PullState::Idle);
                return;
            };
            let Ok(mut host) = shared.try_borrow_mut() else {
                warn!("{}: host busy, {} changes deferred", self.id, changes.len());
                self.needs_resync = true;
                return;
            };
            if std::mem::take(&mut self.needs_resync) {
                self.resync(&mut *host);
            } else {
                for change in changes {
                    match change {
                        HostChange::ContentOffset => self.update_with(&mut *host),
                        HostChange::ContentSize if self.state.is_loading() => self.layout(&mut *host),
                        HostChange::ContentSize => self.check_content_size(&mut *host),
                    }
                }
            }
        }
        self.flush_pending();
    }

    /// Advance the inset animation; returns whether it is still running
    pub fn tick(&mut self, now: Instant) -> bool {
        self.flush_pending();
        let Some((phase, value, done)) = self
            .animation
            .as_ref()
            .map(|anim| (anim.phase, anim.sample(now), anim.is_complete(now)))
        else {
            return false;
        };
        let Some(shared) = self.host.upgrade() else {
            self.animation = None;
            return false;
        };
        let Ok(mut host) = shared.try_borrow_mut() else {
            return true;
        };
        self.write_inset(&mut *host, value);
        if done {
            self.animation = None;
            self.finish_animation(&mut *host, phase);
        }
        !done
    }

    /// Run deferred completions and inset releases
    pub fn flush_pending(&mut self) {
        if let Some(cycle) = self.pending_end.take() {
            self.finish_cycle(cycle);
        }
        if self.release_pending {
            self.release_inset();
        }
    }

    fn resync(&mut self, host: &mut dyn ScrollHost) {
        trace!("{}: resyncing with host", self.id);
        if self.state.is_loading() {
            self.layout(host);
        } else {
            self.check_content_size(host);
        }
        self.update_with(host);
    }

    fn update_with(&mut self, host: &mut dyn ScrollHost) {
        if self.state.is_loading() {
            return;
        }
        if self.hidden {
            self.set_state(PullState::Idle);
            return;
        }

        let distance = edge_distance(&*host, self.edge);
        let threshold = self.view.size().along(host.axis());

        if self.config.trigger.should_trigger(
            host.is_dragging(),
            host.is_decelerating(),
            distance,
            threshold,
        ) {
            debug!("{}: released past threshold ({:.1} < {:.1})", self.id, distance, -threshold);
            let completion = self.next_completion();
            self.set_state(PullState::Loading(completion));
            self.begin_reservation(host, false);
        } else if distance < 0.0 {
            self.set_state(PullState::Pulling {
                offset: distance,
                threshold: -(threshold + self.config.margin),
            });
        } else {
            self.set_state(PullState::Idle);
        }
    }

    fn start_loading_with(&mut self, host: &mut dyn ScrollHost, force: bool) {
        if force {
            if self.edge == Edge::Trailing || self.state.is_loading() {
                return;
            }
            debug!("{}: forced loading", self.id);
            let completion = self.next_completion();
            self.set_state(PullState::Loading(completion));
        }
        if self.state.is_loading() {
            self.begin_reservation(host, force);
        }
    }

    fn check_content_size(&mut self, host: &mut dyn ScrollHost) {
        self.hidden = is_content_short(&*host, self.edge);
        if self.hidden {
            self.set_state(PullState::Idle);
        }
        self.layout(host);
    }

    fn layout(&mut self, host: &mut dyn ScrollHost) {
        let extent = self.view.size().along(host.axis());

        if self.animation.is_none() {
            let delta = self.reservation.resize(extent);
            if delta != 0.0 {
                let mut inset = host.content_inset();
                *inset.side_mut(self.reservation.axis(), self.edge) += delta;
                host.set_content_inset(inset);
                set_edge_distance(&mut *host, self.edge, 0.0);
            }
        }

        let frame = SentinelFrame {
            rect: sentinel_rect(&*host, self.edge, extent, self.reservation.reserved()),
            hidden: self.hidden,
        };
        self.frame = Some(frame);
        host.layout_sentinel(self.id, frame);
        self.view.did_layout(&frame);
    }

    fn begin_reservation(&mut self, host: &mut dyn ScrollHost, reveal: bool) {
        let axis = host.axis();
        let extent = self.view.size().along(axis);
        let current = host.content_inset();

        if self.reservation.is_active() {
            // Loading again before the previous release finished. A release
            // still waiting for the host never touched the inset, so the
            // reservation simply carries over to this cycle.
            if std::mem::take(&mut self.release_pending) && self.animation.is_none() {
                trace!("{}: pending release cancelled by new load", self.id);
                if reveal {
                    set_edge_distance(&mut *host, self.edge, 0.0);
                }
                return;
            }
            if let Some(InsetPhase::Shrink) = self.animation.as_ref().map(|a| a.phase) {
                if let Some(base) = self.reservation.restore_target(self.edge) {
                    let from = current.side(self.reservation.axis(), self.edge);
                    let to = base + self.reservation.reserved();
                    self.animate_inset(host, InsetPhase::Grow, from, to);
                }
            }
            return;
        }

        let Some(target) = self.reservation.reserve(current, axis, self.edge, extent) else {
            return;
        };
        debug!("{}: reserving {:.1} of inset", self.id, extent);
        if reveal {
            set_edge_distance(&mut *host, self.edge, -extent);
        }
        self.animate_inset(host, InsetPhase::Grow, current.side(axis, self.edge), target);
    }

    fn release_inset(&mut self) {
        self.release_pending = false;
        let Some(target) = self.reservation.restore_target(self.edge) else {
            return;
        };
        let Some(shared) = self.host.upgrade() else {
            self.animation = None;
            self.reservation.release();
            return;
        };
        let Ok(mut host) = shared.try_borrow_mut() else {
            self.release_pending = true;
            return;
        };
        let from = host.content_inset().side(self.reservation.axis(), self.edge);
        self.animate_inset(&mut *host, InsetPhase::Shrink, from, target);
    }

    fn animate_inset(&mut self, host: &mut dyn ScrollHost, phase: InsetPhase, from: f64, to: f64) {
        let duration = self.config.inset_animation();
        if duration.is_zero() {
            self.animation = None;
            self.write_inset(host, to);
            self.finish_animation(host, phase);
        } else {
            self.animation = Some(InsetAnimation::new(
                phase,
                from,
                to,
                Instant::now(),
                duration,
                self.config.easing,
            ));
        }
    }

    fn finish_animation(&mut self, host: &mut dyn ScrollHost, phase: InsetPhase) {
        if phase == InsetPhase::Shrink {
            self.reservation.release();
            self.check_content_size(host);
        }
    }

    fn write_inset(&self, host: &mut dyn ScrollHost, value: f64) {
        let mut inset = host.content_inset();
        *inset.side_mut(self.reservation.axis(), self.edge) = value;
        trace!("{}: inset -> {:?}", self.id, inset);
        host.set_content_inset(inset);
    }

    fn next_completion(&mut self) -> Completion {
        self.cycle += 1;
        let cycle = self.cycle;
        let this = self.this.clone();
        let pending = self.pending_end.clone();
        Completion::new(move || {
            let Some(loader) = this.upgrade() else {
                return;
            };
            match loader.try_borrow_mut() {
                Ok(mut loader) => loader.finish_cycle(cycle),
                Err(_) => pending.set(Some(cycle)),
            };
        })
    }

    fn finish_cycle(&mut self, cycle: u64) {
        if self.cycle == cycle {
            self.end_loading();
        }
    }

    fn set_state(&mut self, state: PullState) {
        if self.state == state {
            return;
        }
        trace!("{}: {:?} -> {:?}", self.id, self.state, state);
        self.state = state;
        self.view.did_change_state(&self.state, self.edge);
    }
}
