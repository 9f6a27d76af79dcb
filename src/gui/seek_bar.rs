use eframe::egui;
use crate::playback::{PlaybackState, SeekBarController};

/// Pointer gestures on the progress track, in screen x coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekGesture {
    Down(f32),
    Move(f32),
    Up,
    Leave,
}

pub struct SeekBarWidget {
    pub height: f32,
}

impl SeekBarWidget {
    pub fn new() -> Self {
        Self { height: 36.0 }
    }

    /// Paints the track and reports what the pointer did to it this frame.
    ///
    /// Returns the widget rect (so input can be scoped to it) and the gestures.
    pub fn show(&mut self, ui: &mut egui::Ui, state: &PlaybackState, dragging: bool) -> (egui::Rect, Vec<SeekGesture>) {
        let available_width = ui.available_width() - 90.0; // Leave room for the time label
        let (rect, response) = ui.allocate_exact_size(
            egui::Vec2::new(available_width.max(40.0), self.height),
            egui::Sense::click_and_drag(),
        );

        let track_rect = egui::Rect::from_min_max(
            egui::Pos2::new(rect.min.x, rect.center().y - 4.0),
            egui::Pos2::new(rect.max.x, rect.center().y + 4.0),
        );

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();

            // Track
            painter.rect_filled(
                track_rect,
                egui::Rounding::same(4.0),
                ui.visuals().extreme_bg_color,
            );

            // Played portion
            let ratio = state.progress_ratio.clamp(0.0, 1.0) as f32;
            let played_x = track_rect.min.x + ratio * track_rect.width();
            painter.rect_filled(
                egui::Rect::from_min_max(track_rect.min, egui::Pos2::new(played_x, track_rect.max.y)),
                egui::Rounding::same(4.0),
                ui.visuals().selection.bg_fill,
            );

            // Playhead
            let head_color = if dragging {
                egui::Color32::WHITE
            } else {
                ui.visuals().selection.stroke.color
            };
            painter.circle_filled(egui::Pos2::new(played_x, track_rect.center().y), 7.0, head_color);

            // Hover time
            if let Some(hover) = response.hover_pos() {
                if !dragging && state.duration_seconds > 0.0 {
                    let hover_ratio = ((hover.x - track_rect.min.x) / track_rect.width()).clamp(0.0, 1.0) as f64;
                    painter.text(
                        egui::Pos2::new(hover.x, track_rect.min.y - 6.0),
                        egui::Align2::CENTER_BOTTOM,
                        crate::playback::seek_bar::format_time(hover_ratio * state.duration_seconds),
                        egui::FontId::monospace(10.0),
                        ui.visuals().weak_text_color(),
                    );
                }
            }
        }

        ui.label(egui::RichText::new(SeekBarController::time_label(state)).monospace());

        let gestures = ui.input(|i| {
            let pointer = i.pointer.interact_pos();
            collect_gestures(
                dragging,
                response.hovered(),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                pointer.map(|p| p.x),
                pointer.map_or(false, |p| rect.contains(p)),
            )
        });

        (rect, gestures)
    }
}

impl Default for SeekBarWidget {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps raw pointer state for one frame onto seek gestures.
fn collect_gestures(
    dragging: bool,
    hovered: bool,
    pressed: bool,
    released: bool,
    pointer_x: Option<f32>,
    pointer_inside: bool,
) -> Vec<SeekGesture> {
    let mut gestures = Vec::new();

    if !dragging {
        if pressed && hovered {
            if let Some(x) = pointer_x {
                gestures.push(SeekGesture::Down(x));
            }
        }
        return gestures;
    }

    if released {
        gestures.push(SeekGesture::Up);
    } else if !pointer_inside {
        gestures.push(SeekGesture::Leave);
    } else if let Some(x) = pointer_x {
        gestures.push(SeekGesture::Move(x));
    }
    gestures
}
