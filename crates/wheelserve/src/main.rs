use clap::Parser;
use std::path::PathBuf;
use wheelserve::{DEFAULT_INDEX, DEFAULT_PORT, ServeConfig};

/// Serves the wheel's web assets from a directory.
#[derive(Parser, Debug)]
#[command(name = "wheelserve", version, about, long_about = None)]
struct Cli {
    /// Port to listen on; the next one is tried once if it is taken
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Directory to serve
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Document served for `/`
    #[arg(long, default_value = DEFAULT_INDEX)]
    index: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let listener = wheelserve::bind_with_retry(&cli.host, cli.port).await?;
    wheelserve::serve(
        listener,
        ServeConfig {
            root: cli.root,
            index: cli.index,
        },
    )
    .await?;
    Ok(())
}
