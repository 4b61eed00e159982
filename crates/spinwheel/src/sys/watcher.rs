use crate::events::AppEvent;
use async_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Editors tend to save in several steps; changes this close together become one reload.
const SETTLE_TIME: Duration = Duration::from_millis(150);

fn touches_config(event: &Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

/// Sends `ConfigReload` whenever the file at `config_path` is created, changed or removed.
pub async fn watch_config(config_path: PathBuf, tx: Sender<AppEvent>) {
    let Some(config_dir) = config_path.parent().map(Path::to_path_buf) else {
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }
    log::debug!("Watching {}", config_path.display());

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) if touches_config(&event, &config_path) => {
                // swallow the rest of the burst
                while let Ok(Ok(_)) = tokio::time::timeout(SETTLE_TIME, bridge_rx.recv()).await {}

                if tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    #[test]
    fn test_only_config_changes_count() {
        let config = PathBuf::from("/cfg/spinwheel/config.toml");
        let other = PathBuf::from("/cfg/spinwheel/notes.txt");

        let modify = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(config.clone());
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(config.clone());
        let access = Event::new(EventKind::Access(AccessKind::Any)).add_path(config.clone());
        let unrelated = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(other);

        assert!(touches_config(&modify, &config));
        assert!(touches_config(&create, &config));
        assert!(!touches_config(&access, &config));
        assert!(!touches_config(&unrelated, &config));
    }

    #[tokio::test]
    async fn test_writing_the_file_requests_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let (tx, rx) = async_channel::bounded(8);

        let watched = path.clone();
        let watcher = tokio::spawn(async move { watch_config(watched, tx).await });
        tokio::time::sleep(Duration::from_millis(200)).await;

        fs_err::write(&path, "winner = \"Dony\"\n").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no reload within 5s")
            .unwrap();
        assert_eq!(event, AppEvent::ConfigReload);
        watcher.abort();
    }
}
