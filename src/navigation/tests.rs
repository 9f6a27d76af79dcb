#[cfg(test)]
mod tests {
    use super::super::{Bounds, InputEvent, ItemView, NavigationOrchestrator, Point, ScopedInput};
    use crate::core::{BackendError, BackendRequest, Catalog, Direction, ItemId, ItemResponse, NavigationConfig, PlaybackConfig};
    use crate::playback::test_media::ScriptedMedia;
    use crate::playback::media::MediaEvent;
    use crate::playback::{PlaybackPhase, PlaybackState};
    use std::time::{Duration, Instant};

    type Orchestrator = NavigationOrchestrator<ScriptedMedia>;

    fn orchestrator(initial: &str) -> Orchestrator {
        let mut orchestrator = NavigationOrchestrator::new(
            Some(ItemId::from(initial)),
            ScriptedMedia::default(),
            &NavigationConfig::default(),
            &PlaybackConfig::default(),
        );
        orchestrator.set_container(Some(Bounds::new(0.0, 0.0, 400.0, 600.0)));
        orchestrator.set_seek_area(Some(Bounds::new(20.0, 560.0, 360.0, 20.0)));
        orchestrator
    }

    fn respond(orchestrator: &mut Orchestrator, id: &str) {
        let id = ItemId::from(id);
        let result = Catalog::sample()
            .payload(&id)
            .ok_or_else(|| BackendError::NotFound(id.clone()));
        orchestrator.on_item_loaded(ItemResponse { id, result });
    }

    /// Loads `id` and runs the element until autoplay has settled.
    fn showing(id: &str, now: Instant) -> Orchestrator {
        let mut orchestrator = orchestrator(id);
        orchestrator.drain_requests();
        respond(&mut orchestrator, id);
        orchestrator.tick(now);
        orchestrator.tick(now);
        orchestrator
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn current(orchestrator: &Orchestrator) -> &str {
        orchestrator.current_id().map(|id| id.as_str()).unwrap_or("")
    }

    #[test]
    fn test_construction_requests_initial_item() {
        let mut orchestrator = orchestrator("night-drive");
        assert_eq!(orchestrator.view(), &ItemView::Loading(ItemId::from("night-drive")));
        assert!(matches!(
            orchestrator.drain_requests().as_slice(),
            [BackendRequest::FetchItem(id)] if id.as_str() == "night-drive"
        ));
        assert!(orchestrator.drain_requests().is_empty());
    }

    #[test]
    fn test_loaded_item_starts_playback() {
        let now = Instant::now();
        let orchestrator = showing("night-drive", now);

        let context = orchestrator.context().expect("context after load");
        assert_eq!(context.previous_id, Some(ItemId::from("intro")));
        assert_eq!(context.next_id, Some(ItemId::from("bassline")));
        assert_eq!(orchestrator.playback().phase(), PlaybackPhase::Playing);
        assert_eq!(orchestrator.playback().media().loads[0].url, "https://media.clip-feed.local/night-drive.mp4");
    }

    #[test]
    fn test_advance_without_neighbor_is_a_no_op() {
        let now = Instant::now();
        let mut last = showing("harbor", now);
        assert!(!last.advance(Direction::Next, now));
        assert_eq!(current(&last), "harbor");
        assert!(last.drain_requests().is_empty());
        assert_eq!(last.playback().phase(), PlaybackPhase::Playing);

        let mut first = showing("intro", now);
        assert!(!first.advance(Direction::Prev, now));
        assert_eq!(current(&first), "intro");
    }

    #[test]
    fn test_advance_replaces_context_with_provisional_one() {
        let now = Instant::now();
        let mut orchestrator = showing("night-drive", now);

        assert!(orchestrator.advance(Direction::Next, now));
        let context = orchestrator.context().expect("provisional context");
        assert_eq!(context.current_id, ItemId::from("bassline"));
        assert_eq!(context.previous_id, Some(ItemId::from("night-drive")));
        assert_eq!(context.next_id, None);
        assert!(matches!(
            orchestrator.drain_requests().as_slice(),
            [BackendRequest::FetchItem(id)] if id.as_str() == "bassline"
        ));

        respond(&mut orchestrator, "bassline");
        let context = orchestrator.context().expect("resolved context");
        assert_eq!(context.next_id, Some(ItemId::from("harbor")));
    }

    #[test]
    fn test_unresolved_context_cannot_navigate() {
        let now = Instant::now();
        let mut orchestrator = orchestrator("night-drive");
        assert!(!orchestrator.can_navigate(Direction::Next));
        assert!(!orchestrator.advance(Direction::Next, now));
        assert_eq!(current(&orchestrator), "night-drive");
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let now = Instant::now();
        let mut orchestrator = orchestrator("intro");

        // intro is still in flight when the user picks another item
        orchestrator.navigate_to(ItemId::from("harbor"), now);
        respond(&mut orchestrator, "intro");

        assert_eq!(current(&orchestrator), "harbor");
        assert_eq!(orchestrator.view(), &ItemView::Loading(ItemId::from("harbor")));
        assert!(orchestrator.playback().media().loads.is_empty());

        respond(&mut orchestrator, "harbor");
        assert!(matches!(orchestrator.view(), ItemView::Ready(item) if item.id.as_str() == "harbor"));
    }

    #[test]
    fn test_moving_back_before_fetch_lands_discards_it() {
        let now = Instant::now();
        let mut orchestrator = showing("night-drive", now);

        orchestrator.advance(Direction::Next, now);
        orchestrator.advance(Direction::Prev, now + ms(600));
        assert_eq!(current(&orchestrator), "night-drive");

        respond(&mut orchestrator, "bassline");
        assert_eq!(current(&orchestrator), "night-drive");
        assert_eq!(orchestrator.view(), &ItemView::Loading(ItemId::from("night-drive")));
    }

    #[test]
    fn test_item_change_tears_down_playback() {
        let now = Instant::now();
        let mut orchestrator = showing("night-drive", now);
        orchestrator.playback_mut().handle_event(MediaEvent::TimeUpdate(12.0), now);
        assert!(orchestrator.playback().state().position_seconds > 0.0);

        orchestrator.advance(Direction::Next, now);
        assert_eq!(orchestrator.playback().state(), &PlaybackState::fresh());
        assert_eq!(orchestrator.playback().phase(), PlaybackPhase::Idle);
        assert_eq!(orchestrator.playback().media().unloads, 1);

        respond(&mut orchestrator, "bassline");
        assert_eq!(orchestrator.playback().phase(), PlaybackPhase::Loading);
        assert_eq!(orchestrator.playback().state(), &PlaybackState::fresh());
    }

    #[test]
    fn test_missing_item_is_terminal() {
        let now = Instant::now();
        let mut orchestrator = orchestrator("deleted");
        orchestrator.drain_requests();
        respond(&mut orchestrator, "deleted");

        assert!(matches!(orchestrator.view(), ItemView::NotFound { id, .. } if id.as_str() == "deleted"));
        assert!(!orchestrator.advance(Direction::Next, now));
        orchestrator.tick(now + ms(5_000));
        assert!(orchestrator.drain_requests().is_empty());

        orchestrator.back_to_listing();
        assert_eq!(orchestrator.view(), &ItemView::Listing);
        assert_eq!(orchestrator.current_id(), None);
        assert!(matches!(orchestrator.drain_requests().as_slice(), [BackendRequest::ListItems]));
    }

    #[test]
    fn test_failed_fetch_after_advance_cannot_navigate() {
        let now = Instant::now();
        let mut orchestrator = showing("intro", now);
        assert!(orchestrator.advance(Direction::Next, now));
        orchestrator.drain_requests();

        let id = ItemId::from("night-drive");
        orchestrator.on_item_loaded(ItemResponse {
            id: id.clone(),
            result: Err(BackendError::NotFound(id)),
        });
        assert!(!orchestrator.can_navigate(Direction::Prev));

        let prev = ScopedInput::unscoped(InputEvent::Button(Direction::Prev));
        assert_eq!(orchestrator.handle_input(prev, now + ms(600)), None);
        assert!(matches!(orchestrator.view(), ItemView::NotFound { id, .. } if id.as_str() == "night-drive"));
        assert!(orchestrator.drain_requests().is_empty());
    }

    #[test]
    fn test_button_navigates_once_per_cooldown() {
        let now = Instant::now();
        let mut orchestrator = showing("intro", now);

        let next = ScopedInput::unscoped(InputEvent::Button(Direction::Next));
        assert_eq!(orchestrator.handle_input(next, now), Some(Direction::Next));
        respond(&mut orchestrator, "night-drive");

        assert_eq!(orchestrator.handle_input(next, now + ms(100)), None);
        assert_eq!(current(&orchestrator), "night-drive");

        assert_eq!(orchestrator.handle_input(next, now + ms(600)), Some(Direction::Next));
        assert_eq!(current(&orchestrator), "bassline");
    }

    #[test]
    fn test_wheel_outside_container_is_ignored() {
        let now = Instant::now();
        let mut orchestrator = showing("intro", now);

        let outside = ScopedInput::at(InputEvent::Wheel(120.0), Point::new(800.0, 100.0));
        orchestrator.handle_input(outside, now);
        orchestrator.tick(now + ms(300));
        assert_eq!(current(&orchestrator), "intro");
    }

    #[test]
    fn test_wheel_navigates_after_it_settles() {
        let now = Instant::now();
        let mut orchestrator = showing("intro", now);

        let inside = ScopedInput::at(InputEvent::Wheel(60.0), Point::new(200.0, 200.0));
        assert_eq!(orchestrator.handle_input(inside, now), None);
        assert_eq!(current(&orchestrator), "intro");

        orchestrator.tick(now + ms(150));
        assert_eq!(current(&orchestrator), "night-drive");
    }

    #[test]
    fn test_wheel_over_seek_bar_scrubs_instead() {
        let now = Instant::now();
        let mut orchestrator = showing("intro", now);

        let over_track = ScopedInput::at(InputEvent::Wheel(20.0), Point::new(100.0, 570.0));
        orchestrator.handle_input(over_track, now);
        orchestrator.tick(now + ms(300));

        assert_eq!(current(&orchestrator), "intro");
        assert!((orchestrator.playback().state().position_seconds - 5.0).abs() < 1e-9);
        assert_eq!(orchestrator.playback().media().seeks.len(), 1);
    }

    #[test]
    fn test_input_ignored_while_dragging_seek_bar() {
        let now = Instant::now();
        let mut orchestrator = showing("intro", now);

        orchestrator.on_seek_pointer_down(200.0);
        let next = ScopedInput::unscoped(InputEvent::Button(Direction::Next));
        assert_eq!(orchestrator.handle_input(next, now), None);
        assert_eq!(current(&orchestrator), "intro");

        orchestrator.on_seek_pointer_leave();
        assert!(!orchestrator.playback().state().is_seek_dragging);
        assert_eq!(orchestrator.handle_input(next, now), Some(Direction::Next));
    }

    #[test]
    fn test_refresh_keeps_playback_running() {
        let now = Instant::now();
        let mut orchestrator = showing("bassline", now);
        orchestrator.playback_mut().handle_event(MediaEvent::TimeUpdate(4.0), now);

        orchestrator.refresh();
        assert!(matches!(
            orchestrator.drain_requests().as_slice(),
            [BackendRequest::FetchItem(id)] if id.as_str() == "bassline"
        ));
        respond(&mut orchestrator, "bassline");

        assert_eq!(orchestrator.playback().phase(), PlaybackPhase::Playing);
        assert_eq!(orchestrator.playback().state().position_seconds, 4.0);
        assert_eq!(orchestrator.playback().media().loads.len(), 1);
    }

    #[test]
    fn test_dispose_detaches_and_stops_input() {
        let now = Instant::now();
        let mut orchestrator = showing("intro", now);

        orchestrator.dispose();
        assert_eq!(orchestrator.playback().phase(), PlaybackPhase::Idle);
        assert!(!orchestrator.needs_tick(now));

        let next = ScopedInput::unscoped(InputEvent::Button(Direction::Next));
        assert_eq!(orchestrator.handle_input(next, now + ms(1_000)), None);
        let swipe = ScopedInput::at(InputEvent::Touch(200.0), Point::new(10.0, 10.0));
        assert_eq!(orchestrator.handle_input(swipe, now + ms(1_000)), None);
        assert_eq!(current(&orchestrator), "intro");
    }
}
