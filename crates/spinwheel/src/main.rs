use clap::{Parser, Subcommand};
use relm4::prelude::*;
use spinwheel::gui::app::AppModel;
use spinwheel::gui::theme::WheelTheme;
use spinwheel::gui::wheel;
use spinwheel::sys::{runtime, server};
use spinwheel_core::config;
use spinwheel_core::wheel::SpinController;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spinwheel", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Spin the wheel of the running instance
    Spin,
    /// Put the wheel of the running instance back at its starting angle
    Reset,
    /// Render the idle wheel to a PNG file
    Snapshot {
        path: PathBuf,

        /// Width and height of the image in pixels
        #[arg(short, long, default_value_t = 1024)]
        size: i32,
    },
    /// Write the default configuration file (if missing) and print its path
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Spin) => server::send_command("spin"),
        Some(Commands::Reset) => server::send_command("reset"),
        Some(Commands::Snapshot { path, size }) => snapshot(&path, size),
        Some(Commands::InitConfig) => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
        None => run_app(),
    }
}

fn snapshot(path: &std::path::Path, size: i32) -> anyhow::Result<()> {
    let controller = SpinController::new(&config::load_or_default())?;
    wheel::render_png(
        controller.wheel(),
        controller.rotation(),
        controller.direction(),
        size,
        &WheelTheme::default(),
        path,
    )?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn run_app() -> anyhow::Result<()> {
    let controller = SpinController::new(&config::load_or_default())?;

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx);

    let app = RelmApp::new("org.spinwheel.spinwheel");

    app.run::<AppModel>((controller, rx));
    Ok(())
}
