use std::collections::{HashMap, HashSet};
use crate::core::{BackendError, BackendRequest, Comment, ItemId};

#[derive(Debug, Clone, PartialEq)]
pub enum CommentStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Comments of the displayed item plus the reply composer.
#[derive(Debug)]
pub struct CommentThread {
    item_id: Option<ItemId>,
    comments: Vec<Comment>,
    status: CommentStatus,
    pub draft: String,
    reply_to: Option<String>,
    posting: bool,
    post_error: Option<String>,
}

impl CommentThread {
    pub fn new() -> Self {
        Self {
            item_id: None,
            comments: Vec::new(),
            status: CommentStatus::Idle,
            draft: String::new(),
            reply_to: None,
            posting: false,
            post_error: None,
        }
    }

    pub fn item_id(&self) -> Option<&ItemId> {
        self.item_id.as_ref()
    }

    pub fn status(&self) -> &CommentStatus {
        &self.status
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn is_posting(&self) -> bool {
        self.posting
    }

    pub fn post_error(&self) -> Option<&str> {
        self.post_error.as_deref()
    }

    pub fn reply_to(&self) -> Option<&Comment> {
        let parent = self.reply_to.as_deref()?;
        self.comments.iter().find(|c| c.id == parent)
    }

    pub fn set_reply_to(&mut self, comment_id: Option<String>) {
        self.reply_to = comment_id;
    }

    /// Switches to another item's comments and returns the fetch to send.
    pub fn open(&mut self, item_id: ItemId) -> BackendRequest {
        *self = Self::new();
        self.item_id = Some(item_id.clone());
        self.status = CommentStatus::Loading;
        BackendRequest::FetchComments(item_id)
    }

    /// Re-fetch for the same item, keeping the draft and reply target.
    pub fn refresh_request(&self) -> Option<BackendRequest> {
        self.item_id.clone().map(BackendRequest::FetchComments)
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn apply_loaded(&mut self, item_id: &ItemId, result: Result<Vec<Comment>, BackendError>) {
        if self.item_id.as_ref() != Some(item_id) {
            log::debug!("Dropping comments for {}: no longer shown", item_id);
            return;
        }
        match result {
            Ok(mut comments) => {
                comments.sort_by_key(|c| c.created_at);
                self.comments = comments;
                self.status = CommentStatus::Loaded;
            }
            Err(e) => {
                log::warn!("Failed to load comments for {}: {}", item_id, e);
                self.status = CommentStatus::Failed(e.to_string());
            }
        }
    }

    /// Builds the post request for the current draft.
    pub fn submit(&mut self, author: &str) -> Option<BackendRequest> {
        let item_id = self.item_id.clone()?;
        let text = self.draft.trim();
        if text.is_empty() || self.posting {
            return None;
        }

        self.posting = true;
        self.post_error = None;
        Some(BackendRequest::PostComment {
            item_id,
            author: author.to_string(),
            text: text.to_string(),
            parent_id: self.reply_to.clone(),
        })
    }

    pub fn apply_posted(&mut self, item_id: &ItemId, result: Result<Comment, BackendError>) {
        if self.item_id.as_ref() != Some(item_id) {
            log::debug!("Dropping posted comment for {}: no longer shown", item_id);
            return;
        }
        self.posting = false;
        match result {
            Ok(comment) => {
                self.comments.push(comment);
                self.draft.clear();
                self.reply_to = None;
            }
            Err(e) => {
                log::warn!("Failed to post comment on {}: {}", item_id, e);
                self.post_error = Some(e.to_string());
            }
        }
    }

    /// Comments in display order with their nesting depth.
    ///
    /// Top-level comments come oldest first, each followed by its replies
    /// (recursively). Replies whose parent is missing are shown top-level, and
    /// so is the oldest comment of any reply cycle.
    pub fn threaded(&self) -> Vec<(usize, &Comment)> {
        let known: HashSet<&str> = self.comments.iter().map(|c| c.id.as_str()).collect();
        let mut children: HashMap<Option<&str>, Vec<&Comment>> = HashMap::new();
        for comment in &self.comments {
            let parent = comment
                .parent_id
                .as_deref()
                .filter(|p| known.contains(p) && *p != comment.id);
            children.entry(parent).or_default().push(comment);
        }
        for siblings in children.values_mut() {
            siblings.sort_by_key(|c| c.created_at);
        }

        let mut ordered = Vec::with_capacity(self.comments.len());
        let mut visited: HashSet<&str> = HashSet::new();
        let roots = children.get(&None).cloned().unwrap_or_default();
        for root in roots {
            Self::walk(root, &children, &mut visited, &mut ordered);
        }

        // Anything left is part of a reply cycle
        let mut unreached: Vec<&Comment> = self
            .comments
            .iter()
            .filter(|c| !visited.contains(c.id.as_str()))
            .collect();
        unreached.sort_by_key(|c| c.created_at);
        for comment in unreached {
            if !visited.contains(comment.id.as_str()) {
                Self::walk(comment, &children, &mut visited, &mut ordered);
            }
        }
        ordered
    }

    fn walk<'a>(
        root: &'a Comment,
        children: &HashMap<Option<&'a str>, Vec<&'a Comment>>,
        visited: &mut HashSet<&'a str>,
        ordered: &mut Vec<(usize, &'a Comment)>,
    ) {
        let mut stack = vec![(0, root)];
        while let Some((depth, comment)) = stack.pop() {
            if !visited.insert(comment.id.as_str()) {
                continue;
            }
            ordered.push((depth, comment));
            if let Some(replies) = children.get(&Some(comment.id.as_str())) {
                stack.extend(replies.iter().rev().map(|c| (depth + 1, *c)));
            }
        }
    }
}

impl Default for CommentThread {
    fn default() -> Self {
        Self::new()
    }
}
