use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelTheme {
    pub background: Srgba<f64>,
    pub divider: Srgba<f64>,
    pub rim: Srgba<f64>,
    pub label: Srgba<f64>,
    pub label_shadow: Srgba<f64>,
    pub peg: Srgba<f64>,
    pub hub: Srgba<f64>,
    pub pointer: Srgba<f64>,
}

impl Default for WheelTheme {
    fn default() -> Self {
        Self {
            background: Srgba::new(0.2, 0.2, 0.2, 1.0),
            divider: Srgba::new(0.0, 0.0, 0.0, 0.35),
            rim: Srgba::new(0.87, 0.87, 0.87, 1.0),
            label: Srgba::new(1.0, 1.0, 1.0, 1.0),
            label_shadow: Srgba::new(0.0, 0.0, 0.0, 0.5),
            peg: Srgba::new(0.8, 0.8, 0.8, 1.0),
            hub: Srgba::new(1.0, 0.843, 0.0, 1.0),
            pointer: Srgba::new(1.0, 0.0, 0.0, 1.0),
        }
    }
}

impl WheelTheme {
    /// Segment colours always come from the configuration; the chrome follows the GTK theme.
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let fallback = Self::default();
        Self {
            background: Self::lookup_color(
                context,
                "theme_bg_color",
                fallback.background,
                Some(1.0),
            ),
            divider: Self::lookup_color(context, "borders", fallback.divider, Some(0.35)),
            pointer: Self::lookup_color(context, "error_color", fallback.pointer, Some(1.0)),
            ..fallback
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.wheel-banner {
    font-size: 28px;
    font-weight: bold;
}
.wheel-banner.error {
    color: @error_color;
    font-size: 16px;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
