use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;
use crate::core::item::{Comment, ItemId, ItemPayload, ItemSummary, MediaItem};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("item {0} not found")]
    NotFound(ItemId),
    #[error("feed unavailable: {0}")]
    Unavailable(String),
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Everything the feed view reads from or writes to the outside world.
///
/// Implementations may block; the UI only reaches them through
/// [`crate::core::BackendWorker`].
pub trait FeedBackend: Send + Sync {
    fn list_items(&self) -> Result<Vec<ItemSummary>, BackendError>;
    fn fetch_item(&self, id: &ItemId) -> Result<ItemPayload, BackendError>;
    fn fetch_comments(&self, item_id: &ItemId) -> Result<Vec<Comment>, BackendError>;
    fn post_comment(
        &self,
        item_id: &ItemId,
        author: &str,
        text: &str,
        parent_id: Option<&str>,
    ) -> Result<Comment, BackendError>;
    /// Flips the like flag and returns the new value.
    fn like_toggle(&self, item_id: &ItemId) -> Result<bool, BackendError>;
}

/// On-disk feed catalog. Item order defines the neighbor relation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub items: Vec<MediaItem>,
    #[serde(default)]
    pub comments: HashMap<ItemId, Vec<Comment>>,
}

impl Catalog {
    pub fn sample() -> Self {
        let entries = [
            ("intro", "Launch teaser", "mira", "LAUNCH", 42_000.0, 18.0),
            ("night-drive", "Night drive loop", "kenji", "DRIVE", 1_340_000.0, 32.0),
            ("bassline", "Bassline study #3", "ola", "BASS", 7_800.0, 24.0),
            ("harbor", "Harbor at dawn", "mira", "DAWN", 265_000.0, 45.0),
        ];

        let items = entries
            .iter()
            .map(|(id, title, creator, symbol, cap, duration)| MediaItem {
                id: ItemId::from(*id),
                source_url: format!("https://media.clip-feed.local/{}.mp4", id),
                duration_hint: Some(*duration),
                title: title.to_string(),
                creator: creator.to_string(),
                token_symbol: Some(symbol.to_string()),
                market_cap_usd: Some(*cap),
                like_count: 0,
                liked: false,
            })
            .collect();

        Self {
            items,
            comments: HashMap::new(),
        }
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    pub fn payload(&self, id: &ItemId) -> Option<ItemPayload> {
        let index = self.position(id)?;
        let previous_id = index
            .checked_sub(1)
            .and_then(|i| self.items.get(i))
            .map(|item| item.id.clone());
        let next_id = self.items.get(index + 1).map(|item| item.id.clone());

        Some(ItemPayload {
            item: self.items[index].clone(),
            previous_id,
            next_id,
        })
    }
}

/// [`FeedBackend`] over a JSON catalog file. Likes and comments are written back.
pub struct JsonFeedBackend {
    path: PathBuf,
    catalog: RwLock<Catalog>,
}

impl JsonFeedBackend {
    /// Opens the catalog at `path`, seeding it with sample content when missing.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::info!("No catalog at {}, writing sample feed", path.display());
            let catalog = Catalog::sample();
            Self::write_catalog(path, &catalog)?;
            return Ok(Self::from_catalog(path.to_path_buf(), catalog));
        }

        let catalog = Self::read_catalog(path)?;
        log::info!("Loaded catalog with {} items from {}", catalog.items.len(), path.display());
        Ok(Self::from_catalog(path.to_path_buf(), catalog))
    }

    pub fn from_catalog(path: PathBuf, catalog: Catalog) -> Self {
        Self {
            path,
            catalog: RwLock::new(catalog),
        }
    }

    /// Re-reads the file, keeping the in-memory catalog if the new content is broken.
    pub fn reload(&self) -> anyhow::Result<()> {
        let catalog = Self::read_catalog(&self.path)?;
        let mut guard = self.catalog
            .write()
            .map_err(|_| anyhow::anyhow!("Catalog lock poisoned"))?;
        log::info!("Reloaded catalog ({} items)", catalog.items.len());
        *guard = catalog;
        Ok(())
    }

    fn read_catalog(path: &Path) -> anyhow::Result<Catalog> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read catalog at {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog at {}: {}", path.display(), e))
    }

    fn write_catalog(path: &Path, catalog: &Catalog) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(catalog)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn persist(&self, catalog: &Catalog) -> Result<(), BackendError> {
        Self::write_catalog(&self.path, catalog).map_err(|e| {
            log::error!("Failed to write catalog {}: {}", self.path.display(), e);
            BackendError::Unavailable(e.to_string())
        })
    }

    fn poisoned() -> BackendError {
        BackendError::Unavailable("catalog lock poisoned".to_string())
    }
}

impl FeedBackend for JsonFeedBackend {
    fn list_items(&self) -> Result<Vec<ItemSummary>, BackendError> {
        let catalog = self.catalog.read().map_err(|_| Self::poisoned())?;
        Ok(catalog.items.iter().map(ItemSummary::from).collect())
    }

    fn fetch_item(&self, id: &ItemId) -> Result<ItemPayload, BackendError> {
        let catalog = self.catalog.read().map_err(|_| Self::poisoned())?;
        catalog
            .payload(id)
            .ok_or_else(|| BackendError::NotFound(id.clone()))
    }

    fn fetch_comments(&self, item_id: &ItemId) -> Result<Vec<Comment>, BackendError> {
        let catalog = self.catalog.read().map_err(|_| Self::poisoned())?;
        if catalog.position(item_id).is_none() {
            return Err(BackendError::NotFound(item_id.clone()));
        }

        let mut comments = catalog.comments.get(item_id).cloned().unwrap_or_default();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    fn post_comment(
        &self,
        item_id: &ItemId,
        author: &str,
        text: &str,
        parent_id: Option<&str>,
    ) -> Result<Comment, BackendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BackendError::Rejected("comment is empty".to_string()));
        }

        let mut catalog = self.catalog.write().map_err(|_| Self::poisoned())?;
        if catalog.position(item_id).is_none() {
            return Err(BackendError::NotFound(item_id.clone()));
        }

        let thread = catalog.comments.entry(item_id.clone()).or_default();
        if let Some(parent) = parent_id {
            if !thread.iter().any(|c| c.id == parent) {
                return Err(BackendError::Rejected(format!("unknown parent comment {}", parent)));
            }
        }

        let comment = Comment {
            id: uuid::Uuid::new_v4().to_string(),
            author: author.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
            parent_id: parent_id.map(str::to_string),
        };
        thread.push(comment.clone());

        self.persist(&catalog)?;
        log::debug!("Posted comment {} on {}", comment.id, item_id);
        Ok(comment)
    }

    fn like_toggle(&self, item_id: &ItemId) -> Result<bool, BackendError> {
        let mut catalog = self.catalog.write().map_err(|_| Self::poisoned())?;
        let index = catalog
            .position(item_id)
            .ok_or_else(|| BackendError::NotFound(item_id.clone()))?;

        let prior = (catalog.items[index].liked, catalog.items[index].like_count);
        let item = &mut catalog.items[index];
        item.liked = !item.liked;
        item.like_count = if item.liked {
            item.like_count + 1
        } else {
            item.like_count.saturating_sub(1)
        };
        let liked = item.liked;

        if let Err(e) = self.persist(&catalog) {
            let item = &mut catalog.items[index];
            item.liked = prior.0;
            item.like_count = prior.1;
            return Err(e);
        }
        Ok(liked)
    }
}
