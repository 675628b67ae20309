use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};

use crate::dom::{Document, Target};
use crate::events::{EventBinder, Handler};
use crate::host::{self, HostCapabilities, HostError, Listener};
use crate::profile::HostProfile;
use crate::ready::{ReadyHandler, ReadyState};

/// One host with its binder and ready detector.
///
/// Everything that would otherwise be process-wide state lives here, so
/// several independent documents can coexist in one process.
#[derive(Debug, Clone)]
pub struct Compat {
    binder: EventBinder,
    ready: ReadyState,
}

impl Compat {
    pub fn new(host: Rc<dyn HostCapabilities>) -> Self {
        Self {
            binder: EventBinder::new(Rc::clone(&host)),
            ready: ReadyState::new(host),
        }
    }

    /// Parse `html` and start the host class `profile` describes.
    pub fn from_html(profile: HostProfile, html: &str) -> Result<Self, HostError> {
        let host = host::select(profile, Document::parse(html))?;
        Ok(Self::new(host))
    }

    /// Like [`Compat::from_html`], loading the profile from YAML first.
    pub fn from_profile_file(config_path: Option<PathBuf>, html: &str) -> Result<Self> {
        let profile = HostProfile::load(config_path).context("failed to load host profile")?;
        Self::from_html(profile, html).context("failed to start host")
    }

    pub fn host(&self) -> &Rc<dyn HostCapabilities> {
        self.binder.host()
    }

    pub fn document(&self) -> &Document {
        self.host().document()
    }

    pub fn binder(&self) -> &EventBinder {
        &self.binder
    }

    pub fn ready(&self) -> &ReadyState {
        &self.ready
    }

    pub fn bind(
        &self,
        target: &Target,
        name: &str,
        handler: impl Into<Option<Handler>>,
        capture: bool,
    ) -> Option<Listener> {
        self.binder.bind(target, name, handler, capture)
    }

    pub fn unbind(&self, target: &Target, name: &str, listener: &Listener, capture: bool) {
        self.binder.unbind(target, name, listener, capture)
    }

    pub fn bind_ready(&self, handler: impl Into<Option<ReadyHandler>>) {
        self.ready.bind_ready(handler)
    }
}
