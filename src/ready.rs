//! Document-ready detection.
//!
//! [`ReadyState`] holds the callbacks waiting for the document tree to be
//! parsed and fires them once, in registration order, as soon as the host
//! can tell. Hosts with `DOMContentLoaded` are listened to; the others are
//! polled with [`HostCapabilities::probe_parsed`] until it succeeds.
//!
//! Callbacks are not isolated from each other: if one panics the panic
//! leaves through whatever call drained the queue and the callbacks after
//! it in that drain never run.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::ops::ControlFlow;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::dom::{Document, Target};
use crate::events::EventError;
use crate::host::{HostCapabilities, Listener, TaskId};

const CONTENT_LOADED: &str = "DOMContentLoaded";

/// A callback waiting for the document; receives it explicitly.
pub struct ReadyHandler(Box<dyn FnOnce(&Document)>);

impl ReadyHandler {
    pub fn new(handler: impl FnOnce(&Document) + 'static) -> Self {
        Self(Box::new(handler))
    }

    fn call(self, document: &Document) {
        (self.0)(document)
    }
}

impl fmt::Debug for ReadyHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReadyHandler")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    /// Terminal.
    Ready,
}

enum Detection {
    ContentLoaded(Listener),
    Poll(TaskId),
}

struct ReadyInner {
    host: Rc<dyn HostCapabilities>,
    phase: Cell<Phase>,
    queue: RefCell<Vec<ReadyHandler>>,
    detection: RefCell<Option<Detection>>,
}

#[derive(Clone)]
pub struct ReadyState {
    inner: Rc<ReadyInner>,
}

impl ReadyState {
    pub fn new(host: Rc<dyn HostCapabilities>) -> Self {
        Self {
            inner: Rc::new(ReadyInner {
                host,
                phase: Cell::new(Phase::Pending),
                queue: RefCell::new(Vec::new()),
                detection: RefCell::new(None),
            }),
        }
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    /// Callbacks still waiting in the queue.
    pub fn pending(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    pub fn is_armed(&self) -> bool {
        self.inner.detection.borrow().is_some()
    }

    /// Run `handler` once the document is parsed.
    ///
    /// On an already-parsed document the handler is queued for the next
    /// turn of the host task queue, never run before this call returns.
    /// A missing handler is ignored.
    pub fn bind_ready(&self, handler: impl Into<Option<ReadyHandler>>) {
        let Some(handler) = handler.into() else {
            debug!(target: "dom_compat", error = %EventError::NotAFunction, "bind_ready ignored");
            return;
        };

        let host = &self.inner.host;
        if self.phase() == Phase::Ready || host.readiness().is_parsed() {
            let inner = Rc::downgrade(&self.inner);
            host.queue_task(Box::new(move || {
                if let Some(inner) = inner.upgrade() {
                    handler.call(inner.host.document());
                }
            }));
            return;
        }

        let first = {
            let mut queue = self.inner.queue.borrow_mut();
            queue.push(handler);
            queue.len() == 1
        };
        if first {
            self.arm();
        }
    }

    /// Start watching for readiness. Does nothing once armed or ready.
    pub fn arm(&self) {
        if self.phase() == Phase::Ready || self.is_armed() {
            return;
        }

        let host = &self.inner.host;
        let inner = Rc::downgrade(&self.inner);
        let detection = if host.has_content_loaded() {
            let listener = Listener::new(move |_| {
                if let Some(inner) = inner.upgrade() {
                    ReadyState { inner }.drain();
                }
            });
            host.add_listener(&Target::Document, CONTENT_LOADED, &listener, false);
            Detection::ContentLoaded(listener)
        } else {
            let period = host.profile().ready_poll_interval();
            let id = host.set_interval(
                period,
                Box::new(move || {
                    let Some(inner) = inner.upgrade() else {
                        return ControlFlow::Break(());
                    };
                    match inner.host.probe_parsed() {
                        Ok(()) => {
                            ReadyState { inner }.drain();
                            ControlFlow::Break(())
                        }
                        Err(err) => {
                            trace!(target: "dom_compat", reason = %err, "ready probe");
                            ControlFlow::Continue(())
                        }
                    }
                }),
            );
            Detection::Poll(id)
        };

        debug!(
            target: "dom_compat",
            polling = matches!(detection, Detection::Poll(_)),
            "armed ready detection"
        );
        *self.inner.detection.borrow_mut() = Some(detection);
    }

    /// Stop watching and fire every queued callback in registration
    /// order. Only the first call on a parsed document does anything;
    /// returns how many callbacks ran.
    pub fn drain(&self) -> usize {
        if self.phase() == Phase::Ready {
            return 0;
        }
        let readiness = self.inner.host.readiness();
        if !readiness.is_parsed() {
            debug!(target: "dom_compat", readiness = readiness.as_str(), "drain before parse ignored");
            return 0;
        }
        self.inner.phase.set(Phase::Ready);

        let handlers = mem::take(&mut *self.inner.queue.borrow_mut());
        let count = handlers.len();
        debug!(target: "dom_compat", count, "document ready");

        let host = &self.inner.host;
        let detection = self.inner.detection.borrow_mut().take();
        match detection {
            Some(Detection::ContentLoaded(listener)) => {
                host.remove_listener(&Target::Document, CONTENT_LOADED, &listener, false)
            }
            Some(Detection::Poll(id)) => host.clear_interval(id),
            None => {}
        }

        for handler in handlers {
            handler.call(host.document());
        }
        count
    }
}

impl fmt::Debug for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyState")
            .field("phase", &self.phase())
            .field("pending", &self.pending())
            .field("armed", &self.is_armed())
            .finish()
    }
}
