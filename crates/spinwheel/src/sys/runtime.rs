use super::{server, watcher};
use crate::events::AppEvent;
use async_channel::Sender;
use spinwheel_core::config::get_config_path;
use std::thread;

/// Runs the control socket and config watcher on their own thread, away from the GTK loop.
pub fn start_background_services(tx: Sender<AppEvent>) {
    thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to start background services: {}", e);
                return;
            }
        };

        rt.block_on(async {
            let config_watch = async {
                match get_config_path() {
                    Ok(path) => watcher::watch_config(path, tx.clone()).await,
                    Err(e) => log::error!("Config watcher error: {}", e),
                }
            };

            tokio::join!(server::run_server(tx.clone()), config_watch);
        });
    });
}
