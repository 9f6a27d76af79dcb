/// Which kind of play request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayAttempt {
    /// User asked for sound; first try plays unmuted.
    Unmuted,
    /// Automatic start on load, muted from the outset.
    Muted,
    /// The last chance: muted again after a rejection.
    MutedRetry,
}

impl PlayAttempt {
    pub fn is_muted(self) -> bool {
        !matches!(self, PlayAttempt::Unmuted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Resolved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayDecision {
    /// Playback started. `unmute_after` asks for a delayed best-effort unmute.
    EnterPlaying { unmute_after: bool },
    Retry(PlayAttempt),
    /// Give up until the user interacts.
    Block,
}

/// Next step of the play-with-fallback sequence.
///
/// A rejected unmuted or muted attempt gets exactly one muted retry; a rejected
/// retry blocks. Any attempt that played muted schedules the unmute.
pub fn decide(attempt: PlayAttempt, outcome: PlayOutcome) -> AutoplayDecision {
    match (attempt, outcome) {
        (PlayAttempt::Unmuted, PlayOutcome::Resolved) => {
            AutoplayDecision::EnterPlaying { unmute_after: false }
        }
        (PlayAttempt::Muted | PlayAttempt::MutedRetry, PlayOutcome::Resolved) => {
            AutoplayDecision::EnterPlaying { unmute_after: true }
        }
        (PlayAttempt::Unmuted | PlayAttempt::Muted, PlayOutcome::Rejected) => {
            AutoplayDecision::Retry(PlayAttempt::MutedRetry)
        }
        (PlayAttempt::MutedRetry, PlayOutcome::Rejected) => AutoplayDecision::Block,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autoplay_success_schedules_unmute() {
        assert_eq!(
            decide(PlayAttempt::Muted, PlayOutcome::Resolved),
            AutoplayDecision::EnterPlaying { unmute_after: true }
        );
    }

    #[test]
    fn test_user_play_success_needs_no_unmute() {
        assert_eq!(
            decide(PlayAttempt::Unmuted, PlayOutcome::Resolved),
            AutoplayDecision::EnterPlaying { unmute_after: false }
        );
    }

    #[test]
    fn test_first_rejection_retries_muted() {
        assert_eq!(
            decide(PlayAttempt::Muted, PlayOutcome::Rejected),
            AutoplayDecision::Retry(PlayAttempt::MutedRetry)
        );
        assert_eq!(
            decide(PlayAttempt::Unmuted, PlayOutcome::Rejected),
            AutoplayDecision::Retry(PlayAttempt::MutedRetry)
        );
    }

    #[test]
    fn test_retry_outcomes() {
        assert_eq!(
            decide(PlayAttempt::MutedRetry, PlayOutcome::Resolved),
            AutoplayDecision::EnterPlaying { unmute_after: true }
        );
        assert_eq!(
            decide(PlayAttempt::MutedRetry, PlayOutcome::Rejected),
            AutoplayDecision::Block
        );
    }

    #[test]
    fn test_sequence_never_retries_twice() {
        // Walk the chain from each starting point with every attempt rejected
        for start in [PlayAttempt::Muted, PlayAttempt::Unmuted] {
            let mut attempt = start;
            let mut tries = 1;
            loop {
                match decide(attempt, PlayOutcome::Rejected) {
                    AutoplayDecision::Retry(next) => {
                        attempt = next;
                        tries += 1;
                    }
                    AutoplayDecision::Block => break,
                    AutoplayDecision::EnterPlaying { .. } => panic!("rejection cannot start playback"),
                }
            }
            assert_eq!(tries, 2);
        }
    }

    #[test]
    fn test_muted_flags() {
        assert!(!PlayAttempt::Unmuted.is_muted());
        assert!(PlayAttempt::Muted.is_muted());
        assert!(PlayAttempt::MutedRetry.is_muted());
    }
}
