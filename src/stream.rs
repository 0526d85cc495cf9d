//! Playback driver over a session.
//!
//! A [`Stream`] maps host time through the playback settings and refreshes
//! the session only when the mapped time moved by more than the epsilon,
//! the conversion flags (normal mode included) changed, or a refresh was
//! requested.

use std::path::Path;

use tracing::{debug, trace};

use crate::geom::MeshFlags;
use crate::session::{Session, UpdateStats};
use crate::settings::ImportSettings;
use crate::util::{Chrono, Result};

/// Session plus the state needed to skip redundant refreshes.
pub struct Stream {
    session: Session,
    time: Chrono,
    last_time: Chrono,
    last_flags: MeshFlags,
    force_refresh: bool,
}

impl Stream {
    /// Open `path` in a new session.
    pub fn open(path: impl AsRef<Path>, settings: ImportSettings) -> Result<Self> {
        let mut session = Session::new(settings);
        session.load(path)?;
        Ok(Self::from_session(session))
    }

    /// Drive an existing session. The first [`update`](Self::update) always refreshes.
    pub fn from_session(session: Session) -> Self {
        let last_time = session.settings().playback.adjust_time(0.0);
        let last_flags = session.settings().mesh_flags();
        Self {
            session,
            time: 0.0,
            last_time,
            last_flags,
            force_refresh: true,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Last host time passed to [`update`](Self::update).
    pub fn time(&self) -> Chrono {
        self.time
    }

    /// Archive time of the last refresh.
    pub fn sampled_time(&self) -> Chrono {
        self.last_time
    }

    /// Refresh on the next update regardless of time and flags.
    pub fn request_refresh(&mut self) {
        self.force_refresh = true;
    }

    /// Advance to host time `time`.
    ///
    /// Returns `Some(stats)` when the session was refreshed, `None` when
    /// nothing changed.
    pub fn update(&mut self, time: Chrono) -> Result<Option<UpdateStats>> {
        self.time = time;
        let settings = self.session.settings();
        let adjusted = settings.playback.adjust_time(time);
        let flags = settings.mesh_flags();
        let eps = settings.playback.time_epsilon;

        if !self.force_refresh && flags == self.last_flags && (adjusted - self.last_time).abs() <= eps {
            trace!("No need to update at t={} (t'={})", time, adjusted);
            return Ok(None);
        }

        debug!("Update at t={} (t'={})", time, adjusted);
        self.session.set_time(adjusted);
        let stats = self.session.update()?;

        self.last_time = adjusted;
        self.last_flags = flags;
        self.force_refresh = false;
        Ok(Some(stats))
    }
}
