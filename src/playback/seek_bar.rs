use crate::playback::machine::{PlaybackMachine, PlaybackState};
use crate::playback::media::MediaElement;

/// Horizontal extent of the progress track in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekTrack {
    pub left: f32,
    pub width: f32,
}

/// Turns pointer interaction on the progress track into seek updates.
///
/// Pressing commits a seek right away, moving only previews, and releasing (or
/// leaving the track mid-drag) commits the final position.
pub struct SeekBarController {
    track: Option<SeekTrack>,
    dragging: bool,
    drag_ratio: f64,
    committed_ratio: Option<f64>,
}

impl SeekBarController {
    pub fn new() -> Self {
        Self {
            track: None,
            dragging: false,
            drag_ratio: 0.0,
            committed_ratio: None,
        }
    }

    /// Updates the geometry; `None` means the track is not laid out.
    pub fn set_track(&mut self, track: Option<SeekTrack>) {
        self.track = track;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn usable_track(&self) -> Option<SeekTrack> {
        self.track.filter(|t| t.width > 0.0 && t.width.is_finite())
    }

    fn ratio_at(&self, x: f32) -> Option<f64> {
        let track = self.usable_track()?;
        Some((((x - track.left) / track.width) as f64).clamp(0.0, 1.0))
    }

    pub fn on_pointer_down<M: MediaElement>(&mut self, x: f32, playback: &mut PlaybackMachine<M>) {
        let Some(ratio) = self.ratio_at(x) else {
            return;
        };
        self.dragging = true;
        self.drag_ratio = ratio;
        self.committed_ratio = Some(ratio);
        playback.set_seek_dragging(true);
        playback.commit_seek(ratio);
    }

    pub fn on_pointer_move<M: MediaElement>(&mut self, x: f32, playback: &mut PlaybackMachine<M>) {
        if !self.dragging {
            return;
        }
        let Some(ratio) = self.ratio_at(x) else {
            return;
        };
        self.drag_ratio = ratio;
        playback.preview_seek(ratio);
    }

    pub fn on_pointer_up<M: MediaElement>(&mut self, playback: &mut PlaybackMachine<M>) {
        if !self.dragging {
            return;
        }
        self.dragging = false;

        // A plain click already committed on press
        let moved = self
            .committed_ratio
            .map_or(true, |committed| (committed - self.drag_ratio).abs() > f64::EPSILON);
        if moved {
            playback.commit_seek(self.drag_ratio);
        }
        self.committed_ratio = None;
        playback.set_seek_dragging(false);
    }

    pub fn on_pointer_leave<M: MediaElement>(&mut self, playback: &mut PlaybackMachine<M>) {
        if self.dragging {
            self.on_pointer_up(playback);
        }
    }

    /// Moves the playhead by a relative amount, for the scroll wheel.
    pub fn scrub_by<M: MediaElement>(&mut self, seconds: f64, playback: &mut PlaybackMachine<M>) {
        if self.dragging || self.usable_track().is_none() {
            return;
        }
        let state = playback.state();
        if state.duration_seconds <= 0.0 {
            return;
        }
        let target = (state.position_seconds + seconds).clamp(0.0, state.duration_seconds);
        playback.commit_seek(target / state.duration_seconds);
    }

    /// Drops an in-progress drag without committing it. Used on item change.
    pub fn cancel(&mut self) {
        self.dragging = false;
        self.committed_ratio = None;
        self.drag_ratio = 0.0;
    }

    pub fn time_label(state: &PlaybackState) -> String {
        format!(
            "{} / {}",
            format_time(state.position_seconds),
            format_time(state.duration_seconds)
        )
    }
}

impl Default for SeekBarController {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() { seconds.max(0.0) as u64 } else { 0 };
    format!("{}:{:02}", total / 60, total % 60)
}
