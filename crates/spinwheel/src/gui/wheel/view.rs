use super::{
    HUB_RADIUS, LABEL_FONT_SIZE, LABEL_INSET, LABEL_MAX_WIDTH, PEG_INSET, PEG_RADIUS,
    POINTER_HALF_WIDTH, POINTER_LENGTH, POINTER_OVERLAP, RIM_WIDTH, TEXT_SHADOW_OFFSET,
    WHEEL_MARGIN,
};
use crate::gui::theme::WheelTheme;
use cairo::Context;
use palette::Srgba;
use spinwheel_core::config::SpinDirection;
use spinwheel_core::wheel::{Segment, Wheel, WheelGeometry};
use std::f64::consts::PI;

/// Where the wheel sits inside a drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

impl Layout {
    /// Largest wheel that fits, shifted down to leave room for the pointer above it.
    pub fn fit(width: f64, height: f64) -> Self {
        let pointer_room = POINTER_LENGTH - POINTER_OVERLAP;
        let radius = ((width / 2.0).min(height / (2.0 + pointer_room)) - WHEEL_MARGIN).max(1.0);
        Self {
            center_x: width / 2.0,
            center_y: height / 2.0 + radius * pointer_room / 2.0,
            radius,
        }
    }
}

struct SegmentRenderer<'a> {
    segment: &'a Segment,
    geometry: WheelGeometry,
    direction: SpinDirection,
    radius: f64,
}

impl<'a> SegmentRenderer<'a> {
    fn new(
        segment: &'a Segment,
        geometry: WheelGeometry,
        direction: SpinDirection,
        radius: f64,
    ) -> Self {
        Self {
            segment,
            geometry,
            direction,
            radius,
        }
    }

    fn center(&self) -> f64 {
        self.geometry.draw_angle(self.segment.index, self.direction)
    }

    fn draw(&self, cr: &Context, theme: &WheelTheme) -> Result<(), cairo::Error> {
        self.draw_slice(cr, theme)?;
        self.draw_label(cr, theme)
    }

    fn draw_slice(&self, cr: &Context, theme: &WheelTheme) -> Result<(), cairo::Error> {
        let center = self.center();
        let half = self.geometry.slice_width() / 2.0;

        let (r, g, b) = self.segment.color.rgb().into_components();
        cr.set_source_rgb(r, g, b);
        cr.move_to(0.0, 0.0);
        cr.arc(0.0, 0.0, self.radius, center - half, center + half);
        cr.close_path();
        cr.fill_preserve()?;

        set_source(cr, theme.divider);
        cr.set_line_width(self.radius * 0.006);
        cr.stroke()
    }

    /// Label reads outwards along the slice centre, right-aligned near the rim.
    fn draw_label(&self, cr: &Context, theme: &WheelTheme) -> Result<(), cairo::Error> {
        let text = self.segment.label.as_str();

        cr.save()?;
        cr.rotate(self.center());
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(self.radius * LABEL_FONT_SIZE);

        let mut ext = cr.text_extents(text)?;
        let max_width = self.radius * LABEL_MAX_WIDTH;
        if ext.width() > max_width {
            cr.set_font_size(self.radius * LABEL_FONT_SIZE * max_width / ext.width());
            ext = cr.text_extents(text)?;
        }

        let x = self.radius * (1.0 - LABEL_INSET) - ext.width() - ext.x_bearing();
        let y = -(ext.y_bearing() + ext.height() / 2.0);
        let shadow = self.radius * TEXT_SHADOW_OFFSET;

        set_source(cr, theme.label_shadow);
        cr.move_to(x + shadow, y + shadow);
        cr.show_text(text)?;

        set_source(cr, theme.label);
        cr.move_to(x, y);
        cr.show_text(text)?;
        cr.restore()
    }
}

fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

/// Draws the wheel turned by `rotation` (negative is clockwise), with the pointer fixed at
/// 12 o'clock.
pub fn draw(
    cr: &Context,
    wheel: &Wheel,
    rotation: f64,
    direction: SpinDirection,
    width: f64,
    height: f64,
    theme: &WheelTheme,
) -> Result<(), cairo::Error> {
    let layout = Layout::fit(width, height);
    let geometry = wheel.geometry();

    set_source(cr, theme.background);
    cr.paint()?;

    cr.save()?;
    cr.translate(layout.center_x, layout.center_y);

    draw_rim(cr, layout.radius, theme)?;

    cr.save()?;
    cr.rotate(-rotation);
    for segment in wheel.segments() {
        SegmentRenderer::new(segment, geometry, direction, layout.radius).draw(cr, theme)?;
    }
    draw_pegs(cr, geometry, direction, layout.radius, theme)?;
    cr.restore()?;

    draw_hub(cr, layout.radius, theme)?;
    draw_pointer(cr, layout.radius, theme)?;
    cr.restore()
}

fn draw_rim(cr: &Context, radius: f64, theme: &WheelTheme) -> Result<(), cairo::Error> {
    set_source(cr, theme.rim);
    cr.arc(0.0, 0.0, radius * (1.0 + RIM_WIDTH), 0.0, 2.0 * PI);
    cr.fill()
}

/// One peg on every segment boundary.
fn draw_pegs(
    cr: &Context,
    geometry: WheelGeometry,
    direction: SpinDirection,
    radius: f64,
    theme: &WheelTheme,
) -> Result<(), cairo::Error> {
    let orbit = radius * (1.0 - PEG_INSET);
    set_source(cr, theme.peg);
    for i in 0..geometry.segment_count() {
        let angle = geometry.draw_angle(i, direction) - geometry.slice_width() / 2.0;
        cr.new_sub_path();
        cr.arc(
            orbit * angle.cos(),
            orbit * angle.sin(),
            radius * PEG_RADIUS,
            0.0,
            2.0 * PI,
        );
    }
    cr.fill()
}

fn draw_hub(cr: &Context, radius: f64, theme: &WheelTheme) -> Result<(), cairo::Error> {
    set_source(cr, theme.hub);
    cr.new_path();
    cr.arc(0.0, 0.0, radius * HUB_RADIUS, 0.0, 2.0 * PI);
    cr.fill()
}

fn draw_pointer(cr: &Context, radius: f64, theme: &WheelTheme) -> Result<(), cairo::Error> {
    let tip = -radius * (1.0 - POINTER_OVERLAP);
    let base = tip - radius * POINTER_LENGTH;
    let half_width = radius * POINTER_HALF_WIDTH;

    set_source(cr, theme.pointer);
    cr.new_path();
    cr.move_to(0.0, tip);
    cr.line_to(-half_width, base);
    cr.line_to(half_width, base);
    cr.close_path();
    cr.fill()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fits_inside_area() {
        for (w, h) in [(720.0, 820.0), (1024.0, 1024.0), (1600.0, 400.0), (10.0, 10.0)] {
            let layout = Layout::fit(w, h);
            assert!(layout.radius >= 1.0);
            assert_eq!(layout.center_x, w / 2.0);
            if layout.radius > 1.0 {
                let reach = 1.0 - POINTER_OVERLAP + POINTER_LENGTH;
                let pointer_top = layout.center_y - layout.radius * reach;
                assert!(pointer_top >= 0.0, "pointer clipped in {w}x{h}");
                assert!(layout.center_y + layout.radius <= h);
                assert!(layout.radius <= w / 2.0);
            }
        }
    }
}
