use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a feed item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: ItemId,
    pub source_url: String,
    #[serde(default)]
    pub duration_hint: Option<f64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub token_symbol: Option<String>,
    #[serde(default)]
    pub market_cap_usd: Option<f64>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub liked: bool,
}

impl MediaItem {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            self.id.as_str()
        } else {
            &self.title
        }
    }

    /// Compact market cap, e.g. `$1.25M`.
    pub fn format_market_cap(&self) -> Option<String> {
        self.market_cap_usd.map(format_usd_compact)
    }
}

pub fn format_usd_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("${:.2}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("${:.1}K", value / 1_000.0)
    } else {
        format!("${:.2}", value)
    }
}

/// Result of a single item lookup: the item and its neighbors in feed order.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPayload {
    pub item: MediaItem,
    pub previous_id: Option<ItemId>,
    pub next_id: Option<ItemId>,
}

/// Which item is showing and who its neighbors are.
///
/// Always replaced as a whole when the current item changes so that neighbor
/// ids can never outlive the item they were fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    pub current_id: ItemId,
    pub previous_id: Option<ItemId>,
    pub next_id: Option<ItemId>,
}

impl NavigationContext {
    /// Context for an item whose neighbors are not known yet.
    pub fn unresolved(current_id: ItemId) -> Self {
        Self {
            current_id,
            previous_id: None,
            next_id: None,
        }
    }

    pub fn from_payload(payload: &ItemPayload) -> Self {
        Self {
            current_id: payload.item.id.clone(),
            previous_id: payload.previous_id.clone(),
            next_id: payload.next_id.clone(),
        }
    }

    pub fn neighbor(&self, direction: Direction) -> Option<&ItemId> {
        match direction {
            Direction::Prev => self.previous_id.as_ref(),
            Direction::Next => self.next_id.as_ref(),
        }
    }
}

/// Navigation direction. Forward (`Next`) is away from the start of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Prev,
    Next,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Lightweight listing entry for the feed sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSummary {
    pub id: ItemId,
    pub title: String,
    pub creator: String,
}

impl From<&MediaItem> for ItemSummary {
    fn from(item: &MediaItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.display_title().to_string(),
            creator: item.creator.clone(),
        }
    }
}
