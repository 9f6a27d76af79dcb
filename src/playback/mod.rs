pub mod autoplay;
pub mod machine;
pub mod media;
pub mod seek_bar;

#[cfg(test)]
pub mod test_media;

pub use machine::{PlaybackMachine, PlaybackPhase, PlaybackState};
pub use media::{AutoplayPolicy, ClockMedia, MediaElement, MediaSource};
pub use seek_bar::{SeekBarController, SeekTrack};
