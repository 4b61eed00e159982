use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use std::io::Write;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

const SOCKET_NAME: &str = "spinwheel.sock";

/// Control socket in the user's runtime directory, or `/tmp` when there is none.
pub fn socket_path() -> PathBuf {
    ProjectDirs::from("org", "spinwheel", "spinwheel")
        .and_then(|dirs| dirs.runtime_dir().map(|dir| dir.join(SOCKET_NAME)))
        .unwrap_or_else(|| Path::new("/tmp").join(SOCKET_NAME))
}

pub fn parse_command(line: &str) -> Option<AppEvent> {
    match line.trim() {
        "spin" => Some(AppEvent::Spin),
        "reset" => Some(AppEvent::Reset),
        _ => None,
    }
}

pub async fn run_server(tx: Sender<AppEvent>) {
    run_server_at(&socket_path(), tx).await;
}

pub async fn run_server_at(path: &Path, tx: Sender<AppEvent>) {
    // Cleanup old socket if it exists
    if fs_err::metadata(path).is_ok() {
        let _ = fs_err::remove_file(path);
    }
    if let Some(parent) = path.parent()
        && let Err(e) = fs_err::create_dir_all(parent)
    {
        log::error!("Failed to create socket directory: {}", e);
        return;
    }

    let listener = match UnixListener::bind(path) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", path.display(), e);
            return;
        }
    };
    log::debug!("Listening for commands on {}", path.display());

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match parse_command(&line) {
                            Some(event) => {
                                if tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            None => log::warn!("Unknown command: {:?}", line.trim()),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Sends one command line to a running instance.
pub fn send_command(cmd: &str) -> anyhow::Result<()> {
    let path = socket_path();
    let mut stream = StdUnixStream::connect(&path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to spinwheel at {}: {}. Is spinwheel running?",
            path.display(),
            e
        )
    })?;

    writeln!(stream, "{}", cmd)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::UnixStream;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("spin"), Some(AppEvent::Spin));
        assert_eq!(parse_command("  reset \r"), Some(AppEvent::Reset));
        assert_eq!(parse_command("SPIN"), None);
        assert_eq!(parse_command(""), None);
    }

    #[tokio::test]
    async fn test_socket_forwards_known_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("control.sock");
        let (tx, rx) = async_channel::bounded(8);

        let server_path = path.clone();
        let server = tokio::spawn(async move { run_server_at(&server_path, tx).await });

        let mut stream = loop {
            match UnixStream::connect(&path).await {
                Ok(s) => break s,
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            }
        };
        stream.write_all(b"spin\nwobble\nreset\n").await.unwrap();
        stream.shutdown().await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), AppEvent::Spin);
        assert_eq!(rx.recv().await.unwrap(), AppEvent::Reset);
        server.abort();
    }
}
