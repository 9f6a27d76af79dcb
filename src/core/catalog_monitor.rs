use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct CatalogChanged {
    pub path: PathBuf,
}

/// Watches the directory holding the catalog file and reports edits to it.
pub struct CatalogMonitor {
    _watcher: RecommendedWatcher,
    _event_sender: broadcast::Sender<CatalogChanged>,
}

impl CatalogMonitor {
    pub fn new(catalog_path: &Path) -> anyhow::Result<(Self, broadcast::Receiver<CatalogChanged>)> {
        let (tx, rx) = mpsc::channel();
        let (event_sender, event_receiver) = broadcast::channel(32);

        // Editors often replace the file, so watch the parent directory
        let directory = catalog_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let file_name = catalog_path
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| anyhow::anyhow!("Catalog path has no file name: {}", catalog_path.display()))?;

        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        let event_sender_clone = event_sender.clone();
        thread::spawn(move || {
            while let Ok(event) = rx.recv() {
                let event: Event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        log::warn!("Catalog watch error: {}", e);
                        continue;
                    }
                };

                if !is_content_change(&event.kind) {
                    continue;
                }

                for path in event.paths {
                    if path.file_name() == Some(file_name.as_os_str()) {
                        log::info!("Catalog changed on disk: {}", path.display());
                        // No receivers simply means the UI is not listening right now
                        let _ = event_sender_clone.send(CatalogChanged { path });
                        break;
                    }
                }
            }
            log::debug!("Catalog watcher thread exiting");
        });

        log::info!("Watching catalog {}", catalog_path.display());
        Ok((
            CatalogMonitor {
                _watcher: watcher,
                _event_sender: event_sender,
            },
            event_receiver,
        ))
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    #[test]
    fn test_only_create_and_modify_count_as_changes() {
        assert!(is_content_change(&EventKind::Create(CreateKind::File)));
        assert!(is_content_change(&EventKind::Modify(ModifyKind::Any)));
        assert!(!is_content_change(&EventKind::Access(AccessKind::Any)));
        assert!(!is_content_change(&EventKind::Any));
    }

    #[test]
    fn test_path_without_file_name_is_rejected() {
        assert!(CatalogMonitor::new(Path::new("/")).is_err());
    }
}
