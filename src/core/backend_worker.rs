use std::sync::{Arc, Mutex};
use std::thread;
use tokio::sync::mpsc;
use crate::core::backend::{BackendError, FeedBackend};
use crate::core::item::{Comment, ItemId, ItemPayload, ItemSummary};

/// Work the UI hands to the backend thread
#[derive(Debug, Clone)]
pub enum BackendRequest {
    ListItems,
    FetchItem(ItemId),
    FetchComments(ItemId),
    PostComment {
        item_id: ItemId,
        author: String,
        text: String,
        parent_id: Option<String>,
    },
    LikeToggle(ItemId),
}

/// Result of an item lookup, tagged with the id it was requested for
#[derive(Debug, Clone, PartialEq)]
pub struct ItemResponse {
    pub id: ItemId,
    pub result: Result<ItemPayload, BackendError>,
}

/// Completed backend work. Every variant carries the item it belongs to so the
/// receiver can drop answers for an item that is no longer shown.
#[derive(Debug, Clone)]
pub enum BackendResponse {
    Items(Result<Vec<ItemSummary>, BackendError>),
    Item(ItemResponse),
    Comments {
        item_id: ItemId,
        result: Result<Vec<Comment>, BackendError>,
    },
    CommentPosted {
        item_id: ItemId,
        result: Result<Comment, BackendError>,
    },
    Like {
        item_id: ItemId,
        result: Result<bool, BackendError>,
    },
}

impl BackendResponse {
    fn execute(backend: &dyn FeedBackend, request: BackendRequest) -> Self {
        match request {
            BackendRequest::ListItems => BackendResponse::Items(backend.list_items()),
            BackendRequest::FetchItem(id) => {
                let result = backend.fetch_item(&id);
                BackendResponse::Item(ItemResponse { id, result })
            }
            BackendRequest::FetchComments(item_id) => {
                let result = backend.fetch_comments(&item_id);
                BackendResponse::Comments { item_id, result }
            }
            BackendRequest::PostComment { item_id, author, text, parent_id } => {
                let result = backend.post_comment(&item_id, &author, &text, parent_id.as_deref());
                BackendResponse::CommentPosted { item_id, result }
            }
            BackendRequest::LikeToggle(item_id) => {
                let result = backend.like_toggle(&item_id);
                BackendResponse::Like { item_id, result }
            }
        }
    }
}

/// Runs backend calls on a background tokio runtime so the UI thread never blocks
pub struct BackendWorker {
    request_sender: mpsc::UnboundedSender<BackendRequest>,
    result_receiver: Arc<Mutex<mpsc::UnboundedReceiver<BackendResponse>>>,
}

impl BackendWorker {
    pub fn new(backend: Arc<dyn FeedBackend>) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<BackendRequest>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<BackendResponse>();

        thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to create backend runtime: {}", e);
                    return;
                }
            };

            rt.block_on(async {
                while let Some(request) = request_rx.recv().await {
                    let result_tx = result_tx.clone();
                    let backend = Arc::clone(&backend);

                    // Backend implementations are allowed to block
                    tokio::task::spawn_blocking(move || {
                        log::debug!("Backend request: {:?}", request);
                        let response = BackendResponse::execute(backend.as_ref(), request);

                        if let Err(e) = result_tx.send(response) {
                            log::error!("Failed to send backend response: {}", e);
                        }
                    });
                }
                log::debug!("Backend request channel closed, worker exiting");
            });
        });

        Self {
            request_sender: request_tx,
            result_receiver: Arc::new(Mutex::new(result_rx)),
        }
    }

    /// Queue a request (non-blocking)
    pub fn submit(&self, request: BackendRequest) {
        if let Err(e) = self.request_sender.send(request) {
            log::error!("Failed to send backend request: {}", e);
        }
    }

    /// Drain completed responses (non-blocking)
    pub fn poll(&self) -> Vec<BackendResponse> {
        let mut results = Vec::new();

        if let Ok(mut receiver) = self.result_receiver.lock() {
            while let Ok(result) = receiver.try_recv() {
                results.push(result);
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::{Catalog, JsonFeedBackend};
    use std::time::{Duration, Instant};

    fn wait_for(worker: &BackendWorker, count: usize) -> Vec<BackendResponse> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut responses = Vec::new();
        while responses.len() < count && Instant::now() < deadline {
            responses.extend(worker.poll());
            thread::sleep(Duration::from_millis(5));
        }
        responses
    }

    fn worker() -> BackendWorker {
        let path = std::env::temp_dir()
            .join(format!("clip-feed-worker-{}", uuid::Uuid::new_v4()))
            .join("feed.json");
        let backend = JsonFeedBackend::from_catalog(path, Catalog::sample());
        BackendWorker::new(Arc::new(backend))
    }

    #[test]
    fn test_fetch_item_response_is_tagged_with_request_id() {
        let worker = worker();
        worker.submit(BackendRequest::FetchItem(ItemId::from("night-drive")));

        let responses = wait_for(&worker, 1);
        match responses.as_slice() {
            [BackendResponse::Item(response)] => {
                assert_eq!(response.id, ItemId::from("night-drive"));
                let payload = response.result.as_ref().expect("item should load");
                assert_eq!(payload.next_id, Some(ItemId::from("bassline")));
            }
            other => panic!("Unexpected responses: {:?}", other),
        }
    }

    #[test]
    fn test_failures_come_back_as_responses() {
        let worker = worker();
        worker.submit(BackendRequest::FetchItem(ItemId::from("gone")));

        let responses = wait_for(&worker, 1);
        match responses.as_slice() {
            [BackendResponse::Item(response)] => {
                assert_eq!(response.result, Err(BackendError::NotFound(ItemId::from("gone"))));
            }
            other => panic!("Unexpected responses: {:?}", other),
        }
    }

    #[test]
    fn test_poll_is_empty_without_requests() {
        let worker = worker();
        assert!(worker.poll().is_empty());
    }
}
