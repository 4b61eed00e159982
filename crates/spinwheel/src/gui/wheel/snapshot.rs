use super::view;
use crate::gui::theme::WheelTheme;
use anyhow::Context as _;
use spinwheel_core::config::SpinDirection;
use spinwheel_core::wheel::Wheel;
use std::path::Path;

/// Renders the wheel at `rotation` into a square PNG of `size` pixels.
pub fn render_png(
    wheel: &Wheel,
    rotation: f64,
    direction: SpinDirection,
    size: i32,
    theme: &WheelTheme,
    path: &Path,
) -> anyhow::Result<()> {
    anyhow::ensure!(size > 0, "snapshot size must be positive, got {}", size);

    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, size, size)?;
    {
        let cr = cairo::Context::new(&surface)?;
        view::draw(
            &cr,
            wheel,
            rotation,
            direction,
            size as f64,
            size as f64,
            theme,
        )?;
    }

    let mut file = fs_err::File::create(path)?;
    surface
        .write_to_png(&mut file)
        .with_context(|| format!("Failed to encode {}", path.display()))?;
    Ok(())
}
