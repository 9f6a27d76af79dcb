use std::time::{Duration, Instant};
use crate::core::PlaybackConfig;
use crate::playback::autoplay::{decide, AutoplayDecision, PlayAttempt, PlayOutcome};
use crate::playback::media::{MediaElement, MediaEvent, MediaSource, PlayTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Loading,
    AutoplayAttempting,
    Playing,
    /// Autoplay was refused twice; waiting for the user.
    PlaybackBlocked,
    Paused,
    Ended,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_muted: bool,
    pub progress_ratio: f64,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub is_seek_dragging: bool,
}

impl PlaybackState {
    /// Defaults for a newly attached source; muted so autoplay can succeed.
    pub fn fresh() -> Self {
        Self {
            is_playing: false,
            is_muted: true,
            progress_ratio: 0.0,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            is_seek_dragging: false,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::fresh()
    }
}

fn ratio_of(position: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        (position / duration).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Owns the media element and everything about the current item's playback.
///
/// Nothing else talks to the element directly: seeking, play/pause and mute all
/// go through here.
pub struct PlaybackMachine<M: MediaElement> {
    media: M,
    phase: PlaybackPhase,
    state: PlaybackState,
    source: Option<MediaSource>,
    autoplay_on_load: bool,
    unmute_delay: Duration,
    pending_play: Option<(PlayTicket, PlayAttempt)>,
    next_ticket: u64,
    unmute_at: Option<Instant>,
}

impl<M: MediaElement> PlaybackMachine<M> {
    pub fn new(media: M, config: &PlaybackConfig) -> Self {
        Self {
            media,
            phase: PlaybackPhase::Idle,
            state: PlaybackState::fresh(),
            source: None,
            autoplay_on_load: config.autoplay_on_load,
            unmute_delay: config.unmute_delay(),
            pending_play: None,
            next_ticket: 0,
            unmute_at: None,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    /// Whether a timer or in-flight request needs the host to keep ticking.
    pub fn needs_tick(&self) -> bool {
        self.state.is_playing
            || self.pending_play.is_some()
            || self.unmute_at.is_some()
            || self.phase == PlaybackPhase::Loading
    }

    #[cfg(test)]
    pub fn media(&self) -> &M {
        &self.media
    }

    #[cfg(test)]
    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    /// Drops everything tied to the current source and detaches the element.
    pub fn reset(&mut self) {
        if self.source.is_some() {
            self.media.pause();
            self.media.unload();
        }
        self.source = None;
        self.state = PlaybackState::fresh();
        self.phase = PlaybackPhase::Idle;
        self.pending_play = None;
        self.unmute_at = None;
    }

    /// Attaches a new source. Autoplay starts once the element reports metadata.
    pub fn load(&mut self, source: MediaSource) {
        self.reset();
        log::debug!("Playback: loading {}", source.url);
        self.media.load(&source);
        self.source = Some(source);
        self.phase = PlaybackPhase::Loading;
    }

    /// Polls the element and fires due timers. Call once per frame.
    pub fn tick(&mut self, now: Instant) {
        for event in self.media.poll_events(now) {
            self.handle_event(event, now);
        }

        if let Some(deadline) = self.unmute_at {
            if now >= deadline {
                self.unmute_at = None;
                self.try_unmute();
            }
        }
    }

    pub fn handle_event(&mut self, event: MediaEvent, now: Instant) {
        match event {
            MediaEvent::LoadedMetadata { duration } => {
                self.state.duration_seconds = duration.max(0.0);
                self.state.position_seconds = 0.0;
                self.state.progress_ratio = 0.0;

                if self.phase == PlaybackPhase::Loading {
                    if self.autoplay_on_load {
                        self.phase = PlaybackPhase::AutoplayAttempting;
                        self.start_attempt(PlayAttempt::Muted);
                    } else {
                        self.phase = PlaybackPhase::Paused;
                    }
                }
            }
            MediaEvent::PlayResolved(ticket) => self.settle_play(ticket, PlayOutcome::Resolved, now),
            MediaEvent::PlayRejected(ticket) => self.settle_play(ticket, PlayOutcome::Rejected, now),
            MediaEvent::TimeUpdate(position) => {
                // While dragging, the seek bar owns the displayed position
                if self.state.is_seek_dragging {
                    return;
                }
                self.state.position_seconds = position.max(0.0);
                self.state.progress_ratio = ratio_of(self.state.position_seconds, self.state.duration_seconds);
            }
            MediaEvent::Ended => {
                log::debug!("Playback: reached end of media");
                self.phase = PlaybackPhase::Ended;
                self.state.is_playing = false;
                self.state.position_seconds = 0.0;
                self.state.progress_ratio = 0.0;
                self.pending_play = None;
                self.unmute_at = None;
            }
        }
    }

    fn start_attempt(&mut self, attempt: PlayAttempt) {
        if attempt.is_muted() {
            if self.media.set_muted(true) {
                self.state.is_muted = true;
            }
        } else if self.media.set_muted(false) {
            self.state.is_muted = false;
        }

        self.next_ticket += 1;
        let ticket = PlayTicket(self.next_ticket);
        self.pending_play = Some((ticket, attempt));
        log::debug!("Playback: requesting play ({:?}, ticket {})", attempt, ticket.0);
        self.media.request_play(ticket);
    }

    fn settle_play(&mut self, ticket: PlayTicket, outcome: PlayOutcome, now: Instant) {
        let attempt = match self.pending_play {
            Some((pending, attempt)) if pending == ticket => attempt,
            _ => {
                log::debug!("Playback: ignoring stale play answer for ticket {}", ticket.0);
                return;
            }
        };
        self.pending_play = None;

        match decide(attempt, outcome) {
            AutoplayDecision::EnterPlaying { unmute_after } => {
                self.phase = PlaybackPhase::Playing;
                self.state.is_playing = true;
                if unmute_after {
                    self.unmute_at = Some(now + self.unmute_delay);
                }
            }
            AutoplayDecision::Retry(next) => {
                log::debug!("Playback: {:?} attempt rejected, retrying as {:?}", attempt, next);
                self.start_attempt(next);
            }
            AutoplayDecision::Block => {
                log::debug!("Playback: play blocked until user interaction");
                self.phase = PlaybackPhase::PlaybackBlocked;
                self.state.is_playing = false;
            }
        }
    }

    fn try_unmute(&mut self) {
        if self.phase != PlaybackPhase::Playing || !self.state.is_muted {
            return;
        }
        if self.media.set_muted(false) {
            self.state.is_muted = false;
        } else {
            log::debug!("Playback: element refused unmute, staying muted");
        }
    }

    /// Play/pause button.
    pub fn toggle_play(&mut self) {
        self.media.user_gesture();

        // A second press while a request is in flight cancels it
        if self.pending_play.take().is_some() {
            self.media.pause();
            if self.phase == PlaybackPhase::AutoplayAttempting {
                self.phase = PlaybackPhase::Paused;
            }
            return;
        }

        match self.phase {
            PlaybackPhase::Playing => {
                self.media.pause();
                self.phase = PlaybackPhase::Paused;
                self.state.is_playing = false;
                self.unmute_at = None;
            }
            PlaybackPhase::Paused | PlaybackPhase::PlaybackBlocked | PlaybackPhase::Ended => {
                if self.phase == PlaybackPhase::Ended {
                    self.media.seek(0.0);
                }
                self.start_attempt(PlayAttempt::Unmuted);
            }
            PlaybackPhase::Idle | PlaybackPhase::Loading | PlaybackPhase::AutoplayAttempting => {}
        }
    }

    pub fn toggle_mute(&mut self) {
        if self.source.is_none() {
            return;
        }
        self.media.user_gesture();
        let target = !self.state.is_muted;
        if self.media.set_muted(target) {
            self.state.is_muted = target;
            self.unmute_at = None;
        }
    }

    pub fn set_seek_dragging(&mut self, dragging: bool) {
        self.state.is_seek_dragging = dragging;
    }

    /// Moves the displayed position without touching the element.
    pub fn preview_seek(&mut self, ratio: f64) {
        let ratio = ratio.clamp(0.0, 1.0);
        self.state.progress_ratio = ratio;
        self.state.position_seconds = ratio * self.state.duration_seconds;
    }

    /// Moves the displayed position and seeks the element there.
    pub fn commit_seek(&mut self, ratio: f64) {
        if self.source.is_none() {
            return;
        }
        self.preview_seek(ratio);
        self.media.seek(self.state.position_seconds);
        if self.phase == PlaybackPhase::Ended {
            self.phase = PlaybackPhase::Paused;
        }
    }
}
