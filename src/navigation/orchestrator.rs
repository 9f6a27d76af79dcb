use std::time::Instant;
use crate::core::{BackendRequest, Direction, ItemId, ItemResponse, MediaItem, NavigationConfig, NavigationContext, PlaybackConfig};
use crate::navigation::debouncer::DebouncedNavigator;
use crate::navigation::input::{Bounds, InputEvent, ScopedInput};
use crate::playback::{MediaElement, MediaSource, PlaybackMachine, SeekBarController, SeekTrack};

/// What the detail view is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemView {
    /// No current item; the feed listing is shown.
    Listing,
    Loading(ItemId),
    Ready(MediaItem),
    /// Terminal until the user goes back to the listing.
    NotFound { id: ItemId, reason: String },
}

/// Owns the current item and coordinates navigation, playback and seeking.
///
/// Backend work is not performed here. Requests are queued and drained by the
/// host with [`drain_requests`](Self::drain_requests); answers come back
/// through [`on_item_loaded`](Self::on_item_loaded).
pub struct NavigationOrchestrator<M: MediaElement> {
    context: Option<NavigationContext>,
    view: ItemView,
    navigator: DebouncedNavigator,
    playback: PlaybackMachine<M>,
    seek_bar: SeekBarController,
    container: Option<Bounds>,
    seek_area: Option<Bounds>,
    wheel_threshold: f64,
    wheel_scrub_seconds: f64,
    outbox: Vec<BackendRequest>,
}

impl<M: MediaElement> NavigationOrchestrator<M> {
    pub fn new(
        initial_id: Option<ItemId>,
        media: M,
        navigation: &NavigationConfig,
        playback: &PlaybackConfig,
    ) -> Self {
        let mut orchestrator = Self {
            context: None,
            view: ItemView::Listing,
            navigator: DebouncedNavigator::new(navigation),
            playback: PlaybackMachine::new(media, playback),
            seek_bar: SeekBarController::new(),
            container: None,
            seek_area: None,
            wheel_threshold: navigation.wheel_threshold,
            wheel_scrub_seconds: navigation.wheel_scrub_seconds,
            outbox: Vec::new(),
        };

        if let Some(id) = initial_id {
            orchestrator.context = Some(NavigationContext::unresolved(id.clone()));
            orchestrator.view = ItemView::Loading(id.clone());
            orchestrator.outbox.push(BackendRequest::FetchItem(id));
        }
        orchestrator
    }

    pub fn current_id(&self) -> Option<&ItemId> {
        self.context.as_ref().map(|c| &c.current_id)
    }

    pub fn context(&self) -> Option<&NavigationContext> {
        self.context.as_ref()
    }

    pub fn view(&self) -> &ItemView {
        &self.view
    }

    pub fn current_item(&self) -> Option<&MediaItem> {
        match &self.view {
            ItemView::Ready(item) => Some(item),
            _ => None,
        }
    }

    /// Mutable access for display fields (likes) that change without a reload.
    pub fn current_item_mut(&mut self) -> Option<&mut MediaItem> {
        match &mut self.view {
            ItemView::Ready(item) => Some(item),
            _ => None,
        }
    }

    pub fn can_navigate(&self, direction: Direction) -> bool {
        self.context
            .as_ref()
            .map_or(false, |c| c.neighbor(direction).is_some())
    }

    pub fn navigator(&self) -> &DebouncedNavigator {
        &self.navigator
    }

    pub fn playback(&self) -> &PlaybackMachine<M> {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackMachine<M> {
        &mut self.playback
    }

    pub fn seek_bar(&self) -> &SeekBarController {
        &self.seek_bar
    }

    pub fn drain_requests(&mut self) -> Vec<BackendRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Region that receives navigation input; `None` while not laid out.
    pub fn set_container(&mut self, bounds: Option<Bounds>) {
        self.container = bounds;
    }

    /// Where the progress track sits; `None` while not laid out.
    pub fn set_seek_area(&mut self, bounds: Option<Bounds>) {
        self.seek_area = bounds;
        self.seek_bar.set_track(bounds.map(|b| SeekTrack { left: b.left, width: b.width }));
    }

    pub fn needs_tick(&self, now: Instant) -> bool {
        self.navigator.has_pending_timers(now)
            || self.playback.needs_tick()
            || matches!(self.view, ItemView::Loading(_))
    }

    /// Routes one input event. Returns the direction if it started a transition.
    pub fn handle_input(&mut self, input: ScopedInput, now: Instant) -> Option<Direction> {
        if self.seek_bar.is_dragging() {
            log::trace!("Input ignored during seek drag");
            return None;
        }

        if let Some(pointer) = input.pointer {
            match self.container {
                Some(bounds) if bounds.contains(pointer) => {}
                _ => return None,
            }

            if let InputEvent::Wheel(delta) = input.event {
                if self.seek_area.map_or(false, |area| area.contains(pointer)) {
                    self.scrub_with_wheel(delta);
                    return None;
                }
            }
        }

        let intent = self.navigator.submit(input.event, now)?;
        self.advance(intent.direction, now).then_some(intent.direction)
    }

    fn scrub_with_wheel(&mut self, delta: f64) {
        if !delta.is_finite() || self.wheel_threshold <= 0.0 {
            return;
        }
        // One notch at the navigation threshold scrubs one full step
        let step = self.wheel_scrub_seconds;
        let seconds = (delta / self.wheel_threshold * step).clamp(-step, step);
        self.seek_bar.scrub_by(seconds, &mut self.playback);
    }

    /// Drives navigator timers, media events and the unmute timer.
    pub fn tick(&mut self, now: Instant) {
        if let Some(intent) = self.navigator.tick(now) {
            self.advance(intent.direction, now);
        }
        self.playback.tick(now);
    }

    /// Moves to the neighbor in `direction`. Returns `false` if there is none.
    pub fn advance(&mut self, direction: Direction, now: Instant) -> bool {
        let Some(context) = &self.context else {
            self.navigator.complete();
            return false;
        };
        let Some(target) = context.neighbor(direction).cloned() else {
            log::debug!("No {:?} neighbor for {}", direction, context.current_id);
            self.navigator.complete();
            return false;
        };

        // Only the item we leave behind is known until the fetch lands
        let left_behind = Some(context.current_id.clone());
        let provisional = match direction {
            Direction::Next => NavigationContext {
                current_id: target,
                previous_id: left_behind,
                next_id: None,
            },
            Direction::Prev => NavigationContext {
                current_id: target,
                previous_id: None,
                next_id: left_behind,
            },
        };
        self.begin_transition(provisional, now);
        true
    }

    /// Jumps straight to an item, e.g. from the feed list.
    pub fn navigate_to(&mut self, id: ItemId, now: Instant) {
        if self.current_id() == Some(&id) && !matches!(self.view, ItemView::NotFound { .. }) {
            return;
        }
        self.navigator.complete();
        self.begin_transition(NavigationContext::unresolved(id), now);
    }

    fn begin_transition(&mut self, context: NavigationContext, now: Instant) {
        log::info!("Navigating to {}", context.current_id);
        self.navigator.begin_transition(now);
        self.seek_bar.cancel();
        self.playback.reset();
        self.view = ItemView::Loading(context.current_id.clone());
        self.outbox.push(BackendRequest::FetchItem(context.current_id.clone()));
        self.context = Some(context);
    }

    pub fn on_item_loaded(&mut self, response: ItemResponse) {
        let Some(context) = &self.context else {
            log::debug!("Dropping item response for {}: nothing is shown", response.id);
            return;
        };
        if response.id != context.current_id {
            log::debug!("Dropping stale item response for {} (current: {})", response.id, context.current_id);
            return;
        }

        match response.result {
            Ok(payload) => {
                // A refresh of the item already playing keeps playback going
                let same_source = matches!(
                    &self.view,
                    ItemView::Ready(item) if item.source_url == payload.item.source_url
                );

                self.context = Some(NavigationContext::from_payload(&payload));
                if !same_source {
                    log::info!("Showing item {} ({})", payload.item.id, payload.item.display_title());
                    self.playback.load(MediaSource {
                        url: payload.item.source_url.clone(),
                        duration_hint: payload.item.duration_hint,
                    });
                }
                self.view = ItemView::Ready(payload.item);
            }
            Err(e) => {
                log::warn!("Item {} is not available: {}", response.id, e);
                self.seek_bar.cancel();
                self.playback.reset();
                // Terminal: only the way back to the listing leaves this view
                self.context = Some(NavigationContext::unresolved(response.id.clone()));
                self.view = ItemView::NotFound {
                    id: response.id,
                    reason: e.to_string(),
                };
            }
        }
        self.navigator.complete();
    }

    /// Asks for the current item again, e.g. after the catalog changed on disk.
    pub fn refresh(&mut self) {
        if let (Some(context), ItemView::Ready(_)) = (&self.context, &self.view) {
            self.outbox.push(BackendRequest::FetchItem(context.current_id.clone()));
        }
    }

    /// The recovery action of the not-found view.
    pub fn back_to_listing(&mut self) {
        log::info!("Back to feed listing");
        self.context = None;
        self.view = ItemView::Listing;
        self.seek_bar.cancel();
        self.playback.reset();
        self.navigator.reset();
        self.outbox.push(BackendRequest::ListItems);
    }

    pub fn on_seek_pointer_down(&mut self, x: f32) {
        if self.current_item().is_some() {
            self.seek_bar.on_pointer_down(x, &mut self.playback);
        }
    }

    pub fn on_seek_pointer_move(&mut self, x: f32) {
        self.seek_bar.on_pointer_move(x, &mut self.playback);
    }

    pub fn on_seek_pointer_up(&mut self) {
        self.seek_bar.on_pointer_up(&mut self.playback);
    }

    pub fn on_seek_pointer_leave(&mut self) {
        self.seek_bar.on_pointer_leave(&mut self.playback);
    }

    /// Unmount: stops every timer and detaches the media element.
    pub fn dispose(&mut self) {
        self.navigator.dispose();
        self.seek_bar.cancel();
        self.seek_bar.set_track(None);
        self.seek_area = None;
        self.container = None;
        self.playback.reset();
        self.outbox.clear();
    }
}
