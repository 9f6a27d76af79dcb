use std::time::{Duration, Instant};
use crate::core::{Direction, NavigationConfig};
use crate::navigation::input::{InputEvent, InputSource, Intent};

/// Timers and in-flight state that keep navigation from firing twice.
#[derive(Debug, Clone, Default)]
pub struct NavigationGuard {
    cooldown_until: Option<Instant>,
    pending_direction: Option<Direction>,
    wheel_deadline: Option<Instant>,
    wheel_accumulated: f64,
}

impl NavigationGuard {
    pub fn is_cooldown_active(&self, now: Instant) -> bool {
        self.cooldown_until.map_or(false, |until| now < until)
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    fn clear_wheel(&mut self) {
        self.wheel_deadline = None;
        self.wheel_accumulated = 0.0;
    }
}

/// Turns wheel, touch and button input into at most one intent per cooldown.
pub struct DebouncedNavigator {
    wheel_threshold: f64,
    touch_threshold: f64,
    cooldown: Duration,
    wheel_settle: Duration,
    guard: NavigationGuard,
    disposed: bool,
}

impl DebouncedNavigator {
    pub fn new(config: &NavigationConfig) -> Self {
        Self {
            wheel_threshold: config.wheel_threshold,
            touch_threshold: config.touch_threshold,
            cooldown: config.cooldown(),
            wheel_settle: config.wheel_settle(),
            guard: NavigationGuard::default(),
            disposed: false,
        }
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn submit(&mut self, event: InputEvent, now: Instant) -> Option<Intent> {
        if self.disposed {
            return None;
        }
        if self.guard.is_cooldown_active(now) {
            log::trace!("Navigator: {:?} dropped during cooldown", event);
            return None;
        }

        match event {
            InputEvent::Wheel(delta) => {
                if !delta.is_finite() {
                    return None;
                }
                // Each event pushes the window out; the sum is judged once it settles
                self.guard.wheel_accumulated += delta;
                self.guard.wheel_deadline = Some(now + self.wheel_settle);
                None
            }
            InputEvent::Touch(delta) => self.judge(delta, self.touch_threshold, InputSource::Touch, now),
            InputEvent::Button(direction) => Some(self.emit(direction, InputSource::Button, now)),
        }
    }

    /// Commits a settled wheel gesture, if one is due.
    pub fn tick(&mut self, now: Instant) -> Option<Intent> {
        if self.disposed {
            return None;
        }
        let deadline = self.guard.wheel_deadline?;
        if now < deadline {
            return None;
        }

        let accumulated = self.guard.wheel_accumulated;
        self.guard.clear_wheel();
        if self.guard.is_cooldown_active(now) {
            return None;
        }
        self.judge(accumulated, self.wheel_threshold, InputSource::Wheel, now)
    }

    fn judge(&mut self, delta: f64, threshold: f64, source: InputSource, now: Instant) -> Option<Intent> {
        if !delta.is_finite() || delta.abs() < threshold {
            log::trace!("Navigator: {:?} delta {:.1} below threshold {:.1}", source, delta, threshold);
            return None;
        }
        let direction = if delta > 0.0 { Direction::Next } else { Direction::Prev };
        Some(self.emit(direction, source, now))
    }

    fn emit(&mut self, direction: Direction, source: InputSource, now: Instant) -> Intent {
        self.guard.clear_wheel();
        self.guard.cooldown_until = Some(now + self.cooldown);
        self.guard.pending_direction = Some(direction);
        log::debug!("Navigator: {:?} intent from {:?}", direction, source);
        Intent { direction, source }
    }

    /// Called whenever an item transition starts, whoever started it.
    pub fn begin_transition(&mut self, now: Instant) {
        self.guard.clear_wheel();
        self.guard.cooldown_until = Some(now + self.cooldown);
    }

    /// The transition landed (or was abandoned).
    pub fn complete(&mut self) {
        self.guard.pending_direction = None;
    }

    pub fn reset(&mut self) {
        self.guard = NavigationGuard::default();
        self.disposed = false;
    }

    /// Clears everything and refuses input until the next `reset`.
    pub fn dispose(&mut self) {
        self.guard = NavigationGuard::default();
        self.disposed = true;
    }

    /// Whether a timer still needs the host to keep ticking.
    pub fn has_pending_timers(&self, now: Instant) -> bool {
        self.guard.wheel_deadline.is_some() || self.guard.is_cooldown_active(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn navigator() -> DebouncedNavigator {
        DebouncedNavigator::new(&NavigationConfig::default())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_touch_direction_follows_sign() {
        let start = Instant::now();
        let mut nav = navigator();
        let intent = nav.submit(InputEvent::Touch(80.0), start).expect("swipe should navigate");
        assert_eq!(intent.direction, Direction::Next);
        assert_eq!(intent.source, InputSource::Touch);

        let intent = nav.submit(InputEvent::Touch(-80.0), start + ms(600)).expect("swipe should navigate");
        assert_eq!(intent.direction, Direction::Prev);
    }

    #[test]
    fn test_small_deltas_are_noise() {
        let start = Instant::now();
        let mut nav = navigator();
        assert_eq!(nav.submit(InputEvent::Touch(49.0), start), None);
        assert!(!nav.guard().is_cooldown_active(start));

        nav.submit(InputEvent::Wheel(19.0), start);
        assert_eq!(nav.tick(start + ms(200)), None);
        assert!(!nav.guard().is_cooldown_active(start + ms(200)));
    }

    #[test]
    fn test_wheel_is_coalesced_until_it_settles() {
        let start = Instant::now();
        let mut nav = navigator();

        // Three small notches that only pass the threshold together
        assert_eq!(nav.submit(InputEvent::Wheel(8.0), start), None);
        assert_eq!(nav.submit(InputEvent::Wheel(8.0), start + ms(100)), None);
        assert_eq!(nav.submit(InputEvent::Wheel(8.0), start + ms(200)), None);

        // The window restarted at 200ms
        assert_eq!(nav.tick(start + ms(300)), None);
        let intent = nav.tick(start + ms(350)).expect("settled wheel should navigate");
        assert_eq!(intent.direction, Direction::Next);
        assert_eq!(intent.source, InputSource::Wheel);
        assert_eq!(nav.tick(start + ms(400)), None);
    }

    #[test]
    fn test_wheel_directions_cancel_out() {
        let start = Instant::now();
        let mut nav = navigator();
        nav.submit(InputEvent::Wheel(30.0), start);
        nav.submit(InputEvent::Wheel(-25.0), start + ms(10));
        assert_eq!(nav.tick(start + ms(500)), None);
    }

    #[test]
    fn test_cooldown_drops_every_source() {
        let start = Instant::now();
        let mut nav = navigator();
        assert!(nav.submit(InputEvent::Button(Direction::Next), start).is_some());

        assert_eq!(nav.submit(InputEvent::Button(Direction::Next), start + ms(100)), None);
        assert_eq!(nav.submit(InputEvent::Touch(500.0), start + ms(200)), None);
        assert_eq!(nav.submit(InputEvent::Wheel(500.0), start + ms(300)), None);
        assert_eq!(nav.tick(start + ms(499)), None);

        assert!(nav.submit(InputEvent::Button(Direction::Prev), start + ms(500)).is_some());
    }

    #[test]
    fn test_buttons_skip_threshold() {
        let mut nav = navigator();
        let intent = nav.submit(InputEvent::Button(Direction::Prev), Instant::now());
        assert_eq!(intent.map(|i| i.direction), Some(Direction::Prev));
    }

    #[test]
    fn test_at_most_one_intent_per_window() {
        let start = Instant::now();
        let mut nav = navigator();
        let mut emitted = Vec::new();

        // A noisy burst of mixed input, 10ms apart, for 2 seconds
        for step in 0..200u64 {
            let now = start + ms(step * 10);
            let event = match step % 4 {
                0 => InputEvent::Wheel(15.0),
                1 => InputEvent::Touch(if step % 3 == 0 { 70.0 } else { -70.0 }),
                2 => InputEvent::Button(Direction::Next),
                _ => InputEvent::Wheel(-40.0),
            };
            if nav.submit(event, now).is_some() {
                emitted.push(now);
            }
            if nav.tick(now).is_some() {
                emitted.push(now);
            }
        }

        assert!(!emitted.is_empty());
        for pair in emitted.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= ms(500));
        }
    }

    #[test]
    fn test_begin_transition_clears_wheel_and_arms_cooldown() {
        let start = Instant::now();
        let mut nav = navigator();
        nav.submit(InputEvent::Wheel(100.0), start);

        nav.begin_transition(start + ms(50));
        assert!(nav.guard().is_cooldown_active(start + ms(100)));
        assert_eq!(nav.tick(start + ms(600)), None);
    }

    #[test]
    fn test_complete_clears_pending_direction() {
        let mut nav = navigator();
        nav.submit(InputEvent::Button(Direction::Next), Instant::now());
        assert_eq!(nav.guard().pending_direction(), Some(Direction::Next));
        nav.complete();
        assert_eq!(nav.guard().pending_direction(), None);
    }

    #[test]
    fn test_dispose_stops_input_until_reset() {
        let start = Instant::now();
        let mut nav = navigator();
        nav.submit(InputEvent::Wheel(100.0), start);
        nav.dispose();

        assert!(nav.is_disposed());
        assert!(!nav.has_pending_timers(start));
        assert_eq!(nav.tick(start + ms(200)), None);
        assert_eq!(nav.submit(InputEvent::Button(Direction::Next), start), None);

        nav.reset();
        assert!(nav.submit(InputEvent::Button(Direction::Next), start).is_some());
    }

    #[test]
    fn test_reset_clears_cooldown() {
        let start = Instant::now();
        let mut nav = navigator();
        nav.submit(InputEvent::Touch(90.0), start);
        assert!(nav.has_pending_timers(start + ms(10)));

        nav.reset();
        assert!(!nav.guard().is_cooldown_active(start + ms(10)));
        assert!(nav.submit(InputEvent::Touch(90.0), start + ms(10)).is_some());
    }
}
