use std::collections::VecDeque;
use std::time::Instant;
use crate::playback::autoplay::PlayOutcome;
use crate::playback::media::{MediaElement, MediaEvent, MediaSource, PlayTicket};

/// Media element double that answers play requests from a script.
///
/// Answers are queued and only delivered on the next `poll_events`, like a real
/// element resolving its play promise later.
pub struct ScriptedMedia {
    outcomes: VecDeque<PlayOutcome>,
    queued: Vec<MediaEvent>,
    pub unmute_allowed: bool,
    pub loads: Vec<MediaSource>,
    pub seeks: Vec<f64>,
    pub pauses: usize,
    pub unloads: usize,
    pub play_requests: usize,
    pub gestures: usize,
}

impl ScriptedMedia {
    /// Once the script runs out, every request resolves.
    pub fn with_outcomes(outcomes: &[PlayOutcome]) -> Self {
        Self {
            outcomes: outcomes.iter().copied().collect(),
            queued: Vec::new(),
            unmute_allowed: true,
            loads: Vec::new(),
            seeks: Vec::new(),
            pauses: 0,
            unloads: 0,
            play_requests: 0,
            gestures: 0,
        }
    }
}

impl Default for ScriptedMedia {
    fn default() -> Self {
        Self::with_outcomes(&[])
    }
}

impl MediaElement for ScriptedMedia {
    fn load(&mut self, source: &MediaSource) {
        self.loads.push(source.clone());
        self.queued.clear();
        self.queued.push(MediaEvent::LoadedMetadata {
            duration: source.duration_hint.unwrap_or(10.0),
        });
    }

    fn unload(&mut self) {
        self.unloads += 1;
        self.queued.clear();
    }

    fn request_play(&mut self, ticket: PlayTicket) {
        self.play_requests += 1;
        let event = match self.outcomes.pop_front().unwrap_or(PlayOutcome::Resolved) {
            PlayOutcome::Resolved => MediaEvent::PlayResolved(ticket),
            PlayOutcome::Rejected => MediaEvent::PlayRejected(ticket),
        };
        self.queued.push(event);
    }

    fn pause(&mut self) {
        self.pauses += 1;
    }

    fn set_muted(&mut self, muted: bool) -> bool {
        muted || self.unmute_allowed
    }

    fn seek(&mut self, seconds: f64) {
        self.seeks.push(seconds);
    }

    fn user_gesture(&mut self) {
        self.gestures += 1;
    }

    fn poll_events(&mut self, _now: Instant) -> Vec<MediaEvent> {
        std::mem::take(&mut self.queued)
    }
}
