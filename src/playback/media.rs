// =============================================================================
// MEDIA ELEMENT
// =============================================================================
//
// The playback machine drives a single media element through this trait. Play
// requests are asynchronous: the element answers later through `poll_events`
// with `PlayResolved`/`PlayRejected` for the ticket it was given.
//
// =============================================================================

use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    pub url: String,
    pub duration_hint: Option<f64>,
}

/// Identifies one play request so late answers can be matched or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayTicket(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    LoadedMetadata { duration: f64 },
    PlayResolved(PlayTicket),
    PlayRejected(PlayTicket),
    TimeUpdate(f64),
    Ended,
}

pub trait MediaElement {
    fn load(&mut self, source: &MediaSource);
    fn unload(&mut self);
    fn request_play(&mut self, ticket: PlayTicket);
    fn pause(&mut self);
    /// Returns `false` when the element refuses the change.
    fn set_muted(&mut self, muted: bool) -> bool;
    fn seek(&mut self, seconds: f64);
    /// Called for explicit user interaction; lifts autoplay restrictions.
    fn user_gesture(&mut self) {}
    fn poll_events(&mut self, now: Instant) -> Vec<MediaEvent>;
}

/// How the clock element treats play requests made before any user gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoplayPolicy {
    Allowed,
    MutedOnly,
    Blocked,
}

// =============================================================================
// CLOCK MEDIA
// =============================================================================

const FALLBACK_DURATION: f64 = 30.0;

/// Media element that advances its playhead against the wall clock.
///
/// Used for catalog entries the app cannot decode itself. Applies an
/// [`AutoplayPolicy`] until the first user gesture.
pub struct ClockMedia {
    policy: AutoplayPolicy,
    activated: bool,
    source: Option<MediaSource>,
    duration: f64,
    position: f64,
    is_playing: bool,
    is_muted: bool,
    metadata_reported: bool,
    pending: Vec<MediaEvent>,
    last_tick: Option<Instant>,
}

impl ClockMedia {
    pub fn new(policy: AutoplayPolicy) -> Self {
        Self {
            policy,
            activated: false,
            source: None,
            duration: 0.0,
            position: 0.0,
            is_playing: false,
            is_muted: false,
            metadata_reported: false,
            pending: Vec::new(),
            last_tick: None,
        }
    }

    fn play_allowed(&self) -> bool {
        if self.activated {
            return true;
        }
        match self.policy {
            AutoplayPolicy::Allowed => true,
            AutoplayPolicy::MutedOnly => self.is_muted,
            AutoplayPolicy::Blocked => false,
        }
    }
}

impl MediaElement for ClockMedia {
    fn load(&mut self, source: &MediaSource) {
        self.unload();
        self.duration = source
            .duration_hint
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(FALLBACK_DURATION);
        self.source = Some(source.clone());
        log::debug!("ClockMedia: loaded {} ({:.1}s)", source.url, self.duration);
    }

    fn unload(&mut self) {
        self.source = None;
        self.duration = 0.0;
        self.position = 0.0;
        self.is_playing = false;
        self.metadata_reported = false;
        self.pending.clear();
        self.last_tick = None;
    }

    fn request_play(&mut self, ticket: PlayTicket) {
        if self.source.is_none() {
            self.pending.push(MediaEvent::PlayRejected(ticket));
            return;
        }

        if self.play_allowed() {
            self.pending.push(MediaEvent::PlayResolved(ticket));
        } else {
            log::debug!("ClockMedia: play rejected by {:?} policy (muted: {})", self.policy, self.is_muted);
            self.pending.push(MediaEvent::PlayRejected(ticket));
        }
    }

    fn pause(&mut self) {
        self.is_playing = false;
    }

    fn set_muted(&mut self, muted: bool) -> bool {
        if !muted && !self.activated && self.policy != AutoplayPolicy::Allowed && self.is_playing {
            // Unmuting a non-activated playing element is refused
            return false;
        }
        self.is_muted = muted;
        true
    }

    fn seek(&mut self, seconds: f64) {
        self.position = seconds.clamp(0.0, self.duration);
    }

    fn user_gesture(&mut self) {
        self.activated = true;
    }

    fn poll_events(&mut self, now: Instant) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        if self.source.is_none() {
            return events;
        }

        if !self.metadata_reported {
            self.metadata_reported = true;
            events.push(MediaEvent::LoadedMetadata { duration: self.duration });
        }

        for event in self.pending.drain(..) {
            if let MediaEvent::PlayResolved(_) = event {
                self.is_playing = true;
                self.last_tick = Some(now);
            }
            events.push(event);
        }

        if self.is_playing {
            let elapsed = self.last_tick
                .map(|t| now.saturating_duration_since(t).as_secs_f64())
                .unwrap_or(0.0);
            self.position += elapsed;
            if self.position >= self.duration {
                self.position = 0.0;
                self.is_playing = false;
                events.push(MediaEvent::Ended);
            } else {
                events.push(MediaEvent::TimeUpdate(self.position));
            }
        }
        self.last_tick = Some(now);

        events
    }
}
