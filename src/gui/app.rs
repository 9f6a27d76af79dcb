use eframe::egui;
use crate::core::{
    AppConfig, BackendRequest, BackendResponse, BackendWorker, CatalogChanged, CatalogMonitor, Direction,
    FeedBackend, ItemId, ItemSummary, JsonFeedBackend, MediaItem,
};
use crate::gui::seek_bar::{SeekBarWidget, SeekGesture};
use crate::navigation::{Bounds, InputEvent, ItemView, NavigationOrchestrator, Point, ScopedInput};
use crate::playback::{ClockMedia, PlaybackPhase};
use crate::social::{CommentStatus, CommentThread, LikeTracker};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

pub struct FeedPlayerApp {
    pub config: AppConfig,
    pub backend: Arc<JsonFeedBackend>,
    pub worker: BackendWorker,
    pub orchestrator: NavigationOrchestrator<ClockMedia>,
    pub feed: Vec<ItemSummary>,
    pub comments: CommentThread,
    pub likes: LikeTracker,
    pub catalog_monitor: Option<CatalogMonitor>,
    pub catalog_receiver: Option<broadcast::Receiver<CatalogChanged>>,
    pub seek_bar_widget: SeekBarWidget,
    /// Touch that started inside the item card, for swipe detection
    pub touch_origin: Option<(egui::TouchId, egui::Pos2)>,
    pub status_message: String,
    /// Item the comment thread and saved position currently follow
    pub shown_item: Option<ItemId>,
    /// Off in tests so nothing is written to the user's config directory
    pub persist_config: bool,
}

impl FeedPlayerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, catalog_arg: Option<String>) -> anyhow::Result<Self> {
        let mut visuals = egui::Visuals::dark();
        visuals.override_text_color = Some(egui::Color32::WHITE);
        cc.egui_ctx.set_visuals(visuals);

        let mut config = AppConfig::load()?;
        config.apply_cli_override(catalog_arg);
        Self::with_config(config, true)
    }

    pub fn with_config(config: AppConfig, persist_config: bool) -> anyhow::Result<Self> {
        let backend = Arc::new(JsonFeedBackend::open(&config.catalog_path)?);
        let worker = BackendWorker::new(backend.clone());
        let (catalog_monitor, catalog_receiver) = Self::start_monitor(&config);

        // The catalog is already in memory, so the first listing is immediate
        let feed = backend.list_items().unwrap_or_else(|e| {
            log::warn!("Failed to list catalog items: {}", e);
            Vec::new()
        });
        let initial_id = config
            .last_item_id
            .as_deref()
            .map(ItemId::from)
            .or_else(|| feed.first().map(|s| s.id.clone()));
        if let Some(ref id) = initial_id {
            log::info!("Starting on item {}", id);
        }

        let orchestrator = NavigationOrchestrator::new(
            initial_id,
            ClockMedia::new(config.playback.simulated_autoplay_policy),
            &config.navigation,
            &config.playback,
        );

        Ok(Self {
            config,
            backend,
            worker,
            orchestrator,
            feed,
            comments: CommentThread::new(),
            likes: LikeTracker::new(),
            catalog_monitor,
            catalog_receiver,
            seek_bar_widget: SeekBarWidget::new(),
            touch_origin: None,
            status_message: String::new(),
            shown_item: None,
            persist_config,
        })
    }

    fn start_monitor(config: &AppConfig) -> (Option<CatalogMonitor>, Option<broadcast::Receiver<CatalogChanged>>) {
        if !config.watch_catalog {
            return (None, None);
        }
        match CatalogMonitor::new(&config.catalog_path) {
            Ok((monitor, receiver)) => (Some(monitor), Some(receiver)),
            Err(e) => {
                log::error!("Failed to watch catalog {}: {}", config.catalog_path.display(), e);
                (None, None)
            }
        }
    }

    /// Everything that happens each frame apart from drawing.
    pub fn step(&mut self, now: Instant) {
        self.process_catalog_events();
        self.process_backend_responses();
        self.orchestrator.tick(now);
        self.sync_item_features();
        self.flush_requests();
    }

    fn flush_requests(&mut self) {
        for request in self.orchestrator.drain_requests() {
            self.worker.submit(request);
        }
    }

    fn process_catalog_events(&mut self) {
        let mut changed = false;
        if let Some(ref mut receiver) = self.catalog_receiver {
            while let Ok(event) = receiver.try_recv() {
                log::debug!("Catalog change event: {:?}", event.path);
                changed = true;
            }
        }
        if !changed {
            return;
        }

        match self.backend.reload() {
            Ok(()) => {
                self.orchestrator.refresh();
                self.worker.submit(BackendRequest::ListItems);
                if let Some(request) = self.comments.refresh_request() {
                    self.worker.submit(request);
                }
            }
            Err(e) => {
                log::warn!("Keeping previous catalog: {}", e);
                self.status_message = format!("Catalog reload failed: {}", e);
            }
        }
    }

    fn process_backend_responses(&mut self) {
        for response in self.worker.poll() {
            match response {
                BackendResponse::Items(Ok(items)) => {
                    log::debug!("Feed listing has {} items", items.len());
                    self.feed = items;
                }
                BackendResponse::Items(Err(e)) => {
                    log::warn!("Failed to list feed: {}", e);
                    self.status_message = format!("Could not load feed: {}", e);
                }
                BackendResponse::Item(response) => {
                    self.orchestrator.on_item_loaded(response);
                }
                BackendResponse::Comments { item_id, result } => {
                    self.comments.apply_loaded(&item_id, result);
                }
                BackendResponse::CommentPosted { item_id, result } => {
                    self.comments.apply_posted(&item_id, result);
                }
                BackendResponse::Like { item_id, result } => {
                    let shown = self.orchestrator.current_item_mut();
                    if let Some(message) = self.likes.settle(&item_id, result, shown) {
                        self.status_message = message;
                    }
                }
            }
        }
    }

    /// Keeps comments and the remembered item in step with the shown item.
    fn sync_item_features(&mut self) {
        let shown = self.orchestrator.current_item().map(|item| item.id.clone());
        if shown == self.shown_item {
            return;
        }

        match &shown {
            Some(id) => {
                let request = self.comments.open(id.clone());
                self.worker.submit(request);
                self.remember_item(id);
            }
            None => self.comments.clear(),
        }
        self.shown_item = shown;
    }

    fn remember_item(&mut self, id: &ItemId) {
        self.config.last_item_id = Some(id.to_string());
        if self.persist_config {
            if let Err(e) = self.config.save() {
                log::warn!("Failed to save config: {}", e);
            }
        }
    }

    pub fn select_item(&mut self, id: ItemId, now: Instant) {
        self.orchestrator.navigate_to(id, now);
        self.flush_requests();
    }

    pub fn toggle_like(&mut self) {
        let Some(item) = self.orchestrator.current_item_mut() else {
            return;
        };
        if let Some(request) = self.likes.toggle(item) {
            self.worker.submit(request);
        }
    }

    pub fn post_comment(&mut self) {
        if let Some(request) = self.comments.submit(&self.config.viewer_name) {
            self.worker.submit(request);
        }
    }

    pub fn back_to_listing(&mut self) {
        self.orchestrator.back_to_listing();
        self.flush_requests();
    }

    pub fn open_catalog(&mut self, path: PathBuf) -> anyhow::Result<()> {
        let backend = Arc::new(JsonFeedBackend::open(&path)?);
        log::info!("Switching to catalog {}", path.display());

        self.config.catalog_path = path;
        self.config.last_item_id = None;
        if self.persist_config {
            self.config.save()?;
        }

        self.worker = BackendWorker::new(backend.clone());
        self.feed = backend.list_items().unwrap_or_default();
        self.backend = backend;
        let (monitor, receiver) = Self::start_monitor(&self.config);
        self.catalog_monitor = monitor;
        self.catalog_receiver = receiver;

        self.likes = LikeTracker::new();
        self.comments.clear();
        self.shown_item = None;
        self.orchestrator.back_to_listing();
        self.flush_requests();
        Ok(())
    }

    /// Feeds wheel, swipe and arrow-key input to the orchestrator.
    fn capture_input(&mut self, ctx: &egui::Context, now: Instant) {
        let typing = ctx.wants_keyboard_input();
        let mut inputs = Vec::new();
        let mut toggle_play = false;

        ctx.input(|i| {
            let scroll = i.raw_scroll_delta.y;
            if scroll != 0.0 {
                if let Some(pos) = i.pointer.hover_pos() {
                    // Scrolling down moves forward through the feed
                    inputs.push(ScopedInput::at(InputEvent::Wheel(-scroll as f64), Point::new(pos.x, pos.y)));
                }
            }

            for event in &i.events {
                match event {
                    egui::Event::Touch { id, phase, pos, .. } => match phase {
                        egui::TouchPhase::Start => self.touch_origin = Some((*id, *pos)),
                        egui::TouchPhase::End => {
                            if let Some((origin_id, origin)) = self.touch_origin.take() {
                                if origin_id == *id {
                                    inputs.push(swipe_input(origin, *pos));
                                }
                            }
                        }
                        egui::TouchPhase::Cancel => self.touch_origin = None,
                        egui::TouchPhase::Move => {}
                    },
                    egui::Event::Key { key, pressed: true, repeat: false, .. } if !typing => {
                        match key_direction(*key) {
                            Some(direction) => inputs.push(ScopedInput::unscoped(InputEvent::Button(direction))),
                            None if *key == egui::Key::Space => toggle_play = true,
                            None => {}
                        }
                    }
                    _ => {}
                }
            }
        });

        for input in inputs {
            self.orchestrator.handle_input(input, now);
        }
        if toggle_play {
            self.orchestrator.playback_mut().toggle_play();
        }
    }
}

fn key_direction(key: egui::Key) -> Option<Direction> {
    match key {
        egui::Key::ArrowDown | egui::Key::PageDown | egui::Key::ArrowRight => Some(Direction::Next),
        egui::Key::ArrowUp | egui::Key::PageUp | egui::Key::ArrowLeft => Some(Direction::Prev),
        _ => None,
    }
}

/// Swiping up (finger moving towards the top) moves forward.
fn swipe_input(origin: egui::Pos2, end: egui::Pos2) -> ScopedInput {
    let delta = (origin.y - end.y) as f64;
    ScopedInput::at(InputEvent::Touch(delta), Point::new(origin.x, origin.y))
}

fn bounds_of(rect: egui::Rect) -> Bounds {
    Bounds::new(rect.min.x, rect.min.y, rect.width(), rect.height())
}

impl eframe::App for FeedPlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.capture_input(ctx, now);
        self.step(now);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open catalog…").clicked() {
                        ui.close_menu();
                        let picked = rfd::FileDialog::new()
                            .add_filter("Feed catalog", &["json"])
                            .pick_file();
                        if let Some(path) = picked {
                            if let Err(e) = self.open_catalog(path) {
                                log::error!("Failed to open catalog: {}", e);
                                self.status_message = format!("Error opening catalog: {}", e);
                            }
                        }
                    }

                    ui.separator();

                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("📁 {}", self.config.catalog_path.display()));
                });
            });
        });

        egui::SidePanel::left("feed_list")
            .default_width(240.0)
            .min_width(180.0)
            .show(ctx, |ui| {
                self.show_feed_list(ui, now);
            });

        egui::SidePanel::right("comments")
            .default_width(300.0)
            .min_width(220.0)
            .show(ctx, |ui| {
                self.show_comments(ui);
            });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Status:");
                if self.status_message.is_empty() {
                    ui.label("Ready");
                } else {
                    ui.label(&self.status_message);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label("Scroll, swipe or ↑/↓ to browse · Space to play/pause");
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.orchestrator.set_container(Some(bounds_of(ui.max_rect())));

            match self.orchestrator.view().clone() {
                ItemView::Listing => {
                    self.orchestrator.set_seek_area(None);
                    self.show_listing(ui, now);
                }
                ItemView::Loading(id) => {
                    self.orchestrator.set_seek_area(None);
                    let arrow = match self.orchestrator.navigator().guard().pending_direction() {
                        Some(Direction::Next) => "⏬ ",
                        Some(Direction::Prev) => "⏫ ",
                        None => "",
                    };
                    ui.centered_and_justified(|ui| {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(format!("{}Loading {}…", arrow, id));
                        });
                    });
                }
                ItemView::Ready(item) => self.show_item(ui, &item, now),
                ItemView::NotFound { id, reason } => {
                    self.orchestrator.set_seek_area(None);
                    self.show_not_found(ui, &id, &reason);
                }
            }
        });

        self.flush_requests();

        if self.orchestrator.needs_tick(now) || self.comments.is_posting() || self.likes_pending() {
            ctx.request_repaint();
        } else {
            // Keep polling the worker and the catalog watcher
            ctx.request_repaint_after(Duration::from_millis(200));
        }
    }
}

impl FeedPlayerApp {
    fn likes_pending(&self) -> bool {
        self.shown_item.as_ref().map_or(false, |id| self.likes.is_pending(id))
    }

    fn show_feed_list(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.heading("Feed");
        ui.separator();

        let current = self.orchestrator.current_id().cloned();
        let mut selected = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if self.feed.is_empty() {
                    ui.label("No items in this catalog");
                }
                for summary in &self.feed {
                    let is_current = current.as_ref() == Some(&summary.id);
                    let text = format!("{}\n{}", summary.title, summary.creator);
                    if ui.selectable_label(is_current, text).clicked() {
                        selected = Some(summary.id.clone());
                    }
                    ui.add_space(4.0);
                }
            });

        if let Some(id) = selected {
            self.select_item(id, now);
        }
    }

    fn show_listing(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.vertical_centered(|ui| {
            ui.heading("Pick something to watch");
            ui.add_space(12.0);

            let mut selected = None;
            for summary in &self.feed {
                let label = format!("▶ {} · {}", summary.title, summary.creator);
                if ui.button(label).clicked() {
                    selected = Some(summary.id.clone());
                }
            }
            if let Some(id) = selected {
                self.select_item(id, now);
            }
        });
    }

    fn show_not_found(&mut self, ui: &mut egui::Ui, id: &ItemId, reason: &str) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("This item is not available");
            ui.label(format!("{} ({})", id, reason));
            ui.add_space(20.0);
            if ui.button("⬅ Back to feed").clicked() {
                self.back_to_listing();
            }
        });
    }

    fn show_item(&mut self, ui: &mut egui::Ui, item: &MediaItem, now: Instant) {
        ui.heading(item.display_title());
        ui.horizontal(|ui| {
            ui.label(format!("by {}", item.creator));
            if let Some(symbol) = &item.token_symbol {
                ui.separator();
                ui.label(format!("${}", symbol));
            }
            if let Some(cap) = item.format_market_cap() {
                ui.separator();
                ui.label(format!("Market cap {}", cap));
            }
        });

        ui.add_space(8.0);
        self.show_video_surface(ui);
        ui.add_space(6.0);

        let state = self.orchestrator.playback().state().clone();
        let dragging = self.orchestrator.seek_bar().is_dragging();
        let (seek_rect, gestures) = ui.horizontal(|ui| self.seek_bar_widget.show(ui, &state, dragging)).inner;
        self.orchestrator.set_seek_area(Some(bounds_of(seek_rect)));
        for gesture in gestures {
            match gesture {
                SeekGesture::Down(x) => self.orchestrator.on_seek_pointer_down(x),
                SeekGesture::Move(x) => self.orchestrator.on_seek_pointer_move(x),
                SeekGesture::Up => self.orchestrator.on_seek_pointer_up(),
                SeekGesture::Leave => self.orchestrator.on_seek_pointer_leave(),
            }
        }

        ui.add_space(6.0);
        self.show_controls(ui, item, now);
    }

    fn show_video_surface(&mut self, ui: &mut egui::Ui) {
        let width = ui.available_width();
        let height = (width * 9.0 / 16.0).min(ui.available_height() - 120.0).max(120.0);
        let (rect, response) = ui.allocate_exact_size(egui::Vec2::new(width, height), egui::Sense::click());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            painter.rect_filled(rect, egui::Rounding::same(6.0), egui::Color32::from_gray(16));

            let state = self.orchestrator.playback().state();
            let caption = match self.orchestrator.playback().phase() {
                PlaybackPhase::Idle | PlaybackPhase::Loading => "Loading…",
                PlaybackPhase::AutoplayAttempting => "Starting…",
                PlaybackPhase::Playing => "▶",
                PlaybackPhase::Paused => "⏸",
                PlaybackPhase::PlaybackBlocked => "Autoplay blocked. Press play",
                PlaybackPhase::Ended => "↺ Replay",
            };
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                caption,
                egui::FontId::proportional(28.0),
                egui::Color32::WHITE,
            );

            if state.is_muted {
                painter.text(
                    rect.right_top() + egui::Vec2::new(-12.0, 12.0),
                    egui::Align2::RIGHT_TOP,
                    "🔇",
                    egui::FontId::proportional(18.0),
                    egui::Color32::LIGHT_GRAY,
                );
            }

            if let Some(source) = self.orchestrator.playback().source() {
                painter.text(
                    rect.left_bottom() + egui::Vec2::new(12.0, -10.0),
                    egui::Align2::LEFT_BOTTOM,
                    &source.url,
                    egui::FontId::monospace(10.0),
                    egui::Color32::GRAY,
                );
            }
        }

        if response.clicked() {
            self.orchestrator.playback_mut().toggle_play();
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui, item: &MediaItem, now: Instant) {
        let is_playing = self.orchestrator.playback().state().is_playing;
        let is_muted = self.orchestrator.playback().state().is_muted;

        ui.horizontal(|ui| {
            let can_prev = self.orchestrator.can_navigate(Direction::Prev);
            if ui.add_enabled(can_prev, egui::Button::new("⏮ Prev")).clicked() {
                self.orchestrator.handle_input(ScopedInput::unscoped(InputEvent::Button(Direction::Prev)), now);
            }

            if ui.button(if is_playing { "⏸" } else { "▶" }).clicked() {
                self.orchestrator.playback_mut().toggle_play();
            }

            if ui.button(if is_muted { "🔇" } else { "🔊" }).clicked() {
                self.orchestrator.playback_mut().toggle_mute();
            }

            let can_next = self.orchestrator.can_navigate(Direction::Next);
            if ui.add_enabled(can_next, egui::Button::new("Next ⏭")).clicked() {
                self.orchestrator.handle_input(ScopedInput::unscoped(InputEvent::Button(Direction::Next)), now);
            }

            ui.separator();

            let heart = if item.liked { "♥" } else { "♡" };
            let like_button = egui::Button::new(format!("{} {}", heart, item.like_count));
            if ui.add_enabled(!self.likes.is_pending(&item.id), like_button).clicked() {
                self.toggle_like();
            }
        });
    }

    fn show_comments(&mut self, ui: &mut egui::Ui) {
        ui.heading(format!("Comments ({})", self.comments.comments().len()));
        ui.separator();

        if self.comments.item_id().is_none() {
            ui.label("Open an item to see its comments");
            return;
        }

        match self.comments.status() {
            CommentStatus::Loading => {
                ui.spinner();
            }
            CommentStatus::Failed(e) => {
                ui.colored_label(egui::Color32::LIGHT_RED, format!("Could not load comments: {}", e));
            }
            CommentStatus::Idle | CommentStatus::Loaded => {}
        }

        let mut reply_target = None;
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 140.0)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (depth, comment) in self.comments.threaded() {
                    ui.horizontal(|ui| {
                        ui.add_space(depth as f32 * 16.0);
                        ui.vertical(|ui| {
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(&comment.author).strong());
                                ui.small(comment.created_at.format("%Y-%m-%d %H:%M").to_string());
                                if ui.small_button("Reply").clicked() {
                                    reply_target = Some(comment.id.clone());
                                }
                            });
                            ui.label(&comment.text);
                        });
                    });
                    ui.add_space(4.0);
                }
            });
        if reply_target.is_some() {
            self.comments.set_reply_to(reply_target);
        }

        ui.separator();

        let replying_to = self.comments.reply_to().map(|c| c.author.clone());
        if let Some(author) = replying_to {
            ui.horizontal(|ui| {
                ui.small(format!("Replying to {}", author));
                if ui.small_button("✕").clicked() {
                    self.comments.set_reply_to(None);
                }
            });
        }

        ui.add(egui::TextEdit::multiline(&mut self.comments.draft).desired_rows(2).hint_text("Add a comment"));
        ui.horizontal(|ui| {
            let can_post = !self.comments.is_posting() && !self.comments.draft.trim().is_empty();
            if ui.add_enabled(can_post, egui::Button::new("Post")).clicked() {
                self.post_comment();
            }
            ui.small(format!("as {}", self.config.viewer_name));
        });
        if let Some(error) = self.comments.post_error() {
            ui.colored_label(egui::Color32::LIGHT_RED, error);
        }
    }
}

impl Drop for FeedPlayerApp {
    fn drop(&mut self) {
        self.orchestrator.dispose();
    }
}
