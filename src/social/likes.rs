use std::collections::HashMap;
use crate::core::{BackendError, BackendRequest, ItemId, MediaItem};

#[derive(Debug, Clone, Copy)]
struct PriorLike {
    liked: bool,
    like_count: u64,
}

/// Optimistic like toggling with rollback when the backend refuses.
#[derive(Debug, Default)]
pub struct LikeTracker {
    in_flight: HashMap<ItemId, PriorLike>,
}

impl LikeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, item_id: &ItemId) -> bool {
        self.in_flight.contains_key(item_id)
    }

    /// Flips the item locally and returns the request to send, unless a toggle
    /// for the same item is still in flight.
    pub fn toggle(&mut self, item: &mut MediaItem) -> Option<BackendRequest> {
        if self.is_pending(&item.id) {
            return None;
        }

        self.in_flight.insert(
            item.id.clone(),
            PriorLike {
                liked: item.liked,
                like_count: item.like_count,
            },
        );
        set_liked(item, !item.liked);
        Some(BackendRequest::LikeToggle(item.id.clone()))
    }

    /// Settles a toggle. `item` is the displayed item, if any; it is only
    /// touched when it is the one the answer belongs to.
    ///
    /// Returns a status message for failures.
    pub fn settle(
        &mut self,
        item_id: &ItemId,
        result: Result<bool, BackendError>,
        item: Option<&mut MediaItem>,
    ) -> Option<String> {
        let prior = self.in_flight.remove(item_id);
        let item = item.filter(|item| &item.id == item_id);

        match result {
            Ok(liked) => {
                if let Some(item) = item {
                    set_liked(item, liked);
                }
                None
            }
            Err(e) => {
                log::warn!("Like toggle for {} failed: {}", item_id, e);
                if let (Some(item), Some(prior)) = (item, prior) {
                    item.liked = prior.liked;
                    item.like_count = prior.like_count;
                }
                Some(format!("Could not update like: {}", e))
            }
        }
    }
}

fn set_liked(item: &mut MediaItem, liked: bool) {
    if item.liked == liked {
        return;
    }
    item.liked = liked;
    item.like_count = if liked {
        item.like_count.saturating_add(1)
    } else {
        item.like_count.saturating_sub(1)
    };
}
