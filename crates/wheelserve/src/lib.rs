use std::io;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_INDEX: &str = "index.html";
/// Request line plus headers; anything longer is answered 400.
pub const MAX_HEAD_BYTES: u64 = 16 * 1024;
const RETRY_DELAY: Duration = Duration::from_secs(1);

const MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("js", "text/javascript"),
    ("css", "text/css"),
    ("json", "application/json"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
];

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub root: PathBuf,
    pub index: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            index: DEFAULT_INDEX.to_string(),
        }
    }
}

/// Content type by file extension; anything unlisted is `application/octet-stream`.
pub fn content_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            MIME_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or("application/octet-stream")
}

/// A request target mapped onto the served directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// Relative form used in responses and logs, e.g. `./app.js`.
    pub display: String,
    /// `None` when the target tries to leave the root.
    pub file: Option<PathBuf>,
}

pub fn resolve(config: &ServeConfig, target: &str) -> Resolved {
    let path = target.split(['?', '#']).next().unwrap_or_default();
    let relative = match path.trim_start_matches('/') {
        "" => config.index.as_str(),
        rest => rest,
    };
    let display = format!("./{}", relative);

    let escapes = Path::new(relative)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    let file = (!escapes).then(|| config.root.join(relative));

    Resolved { display, file }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }

    fn text(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.into_bytes(),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            _ => "Internal Server Error",
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len()
        )
        .into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

/// Reads the file a request target names and builds the response for it.
pub async fn respond(config: &ServeConfig, target: &str) -> Response {
    let resolved = resolve(config, target);
    let Some(file) = resolved.file else {
        log::warn!("404: {} (outside root)", resolved.display);
        return Response::text(404, format!("File not found: {}", resolved.display));
    };

    match tokio::fs::read(&file).await {
        Ok(content) => Response::ok(content_type(&file), content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("404: {}", resolved.display);
            Response::text(404, format!("File not found: {}", resolved.display))
        }
        Err(e) => {
            log::error!("500: {:?} reading {}", e.kind(), resolved.display);
            Response::text(500, format!("Error: {:?}", e.kind()))
        }
    }
}

#[derive(Debug, PartialEq)]
enum Head {
    /// The client went away before sending a request line.
    Closed,
    Request(String),
    TooLarge,
}

/// Reads the request line and skips the headers, never buffering more than
/// `MAX_HEAD_BYTES`.
async fn read_head<R: AsyncRead + Unpin>(reader: R) -> io::Result<Head> {
    let mut head = BufReader::new(reader.take(MAX_HEAD_BYTES));

    let mut request_line = String::new();
    head.read_line(&mut request_line).await?;
    if !request_line.ends_with('\n') {
        return Ok(if head.get_ref().limit() == 0 {
            Head::TooLarge
        } else {
            Head::Closed
        });
    }

    // Headers are ignored.
    let mut header = String::new();
    loop {
        header.clear();
        head.read_line(&mut header).await?;
        if !header.ends_with('\n') {
            if head.get_ref().limit() == 0 {
                return Ok(Head::TooLarge);
            }
            break;
        }
        if header.trim_end().is_empty() {
            break;
        }
    }

    Ok(Head::Request(request_line.trim_end().to_string()))
}

async fn handle_connection(stream: TcpStream, config: Arc<ServeConfig>) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();

    let request_line = match read_head(reader).await? {
        Head::Closed => return Ok(()),
        Head::Request(line) => line,
        Head::TooLarge => {
            log::warn!("Request head over {} bytes", MAX_HEAD_BYTES);
            let response = Response::text(400, "Request header too large".to_string());
            writer.write_all(&response.to_bytes()).await?;
            return writer.shutdown().await;
        }
    };

    let mut parts = request_line.split_whitespace();
    let response = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => {
            log::info!("Request: {} {}", method, target);
            respond(&config, target).await
        }
        _ => {
            log::warn!("Malformed request line: {:?}", request_line);
            Response::text(400, "Bad request".to_string())
        }
    };

    writer.write_all(&response.to_bytes()).await?;
    writer.shutdown().await
}

/// Binds `host:port`; if the port is taken, waits a second and tries `port + 1` once.
pub async fn bind_with_retry(host: &str, port: u16) -> Result<TcpListener, ServeError> {
    let bind = |port: u16| {
        let addr = format!("{}:{}", host, port);
        async move {
            TcpListener::bind(&addr)
                .await
                .map_err(|source| ServeError::Bind { addr, source })
        }
    };

    match bind(port).await {
        Err(ServeError::Bind { source, .. }) if source.kind() == io::ErrorKind::AddrInUse => {
            log::warn!("Address in use, retrying on port {}...", port.wrapping_add(1));
            tokio::time::sleep(RETRY_DELAY).await;
            bind(port.wrapping_add(1)).await
        }
        other => other,
    }
}

/// Accepts connections forever, one task per connection.
pub async fn serve(listener: TcpListener, config: ServeConfig) -> Result<(), ServeError> {
    let config = Arc::new(config);
    let addr: SocketAddr = listener.local_addr()?;
    log::info!("Serving {} at http://{}/", config.root.display(), addr);

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let config = config.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, config).await {
                        log::debug!("Connection from {} ended: {}", peer, e);
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}
