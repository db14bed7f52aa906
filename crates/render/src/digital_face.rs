//! Plain digital clock face

use gtk4::cairo;

use crate::flip_card::Rect;
use crate::pango_text::{show_text_centered, FontSpec};
use klock_types::{ClockPosition, Color};

/// Draw the clock text centered on `position` (percent of the area).
///
/// Returns the text's bounding box so callers can hit-test drags.
pub fn render_plain_clock(
    cr: &cairo::Context,
    text: &str,
    color: Color,
    font: &FontSpec,
    position: ClockPosition,
    width: f64,
    height: f64,
) -> Result<Rect, cairo::Error> {
    let cx = width * position.left / 100.0;
    let cy = height * position.top / 100.0;

    cr.save()?;
    color.apply_to_cairo(cr);
    let extents = show_text_centered(cr, text, font, cx, cy);
    cr.restore()?;

    Ok(Rect {
        x: cx - extents.width / 2.0,
        y: cy - extents.height / 2.0,
        width: extents.width,
        height: extents.height,
    })
}

/// Whether a pointer position falls inside the last drawn clock text
pub fn hit_test(bounds: &Rect, x: f64, y: f64) -> bool {
    x >= bounds.x && x <= bounds.x + bounds.width && y >= bounds.y && y <= bounds.y + bounds.height
}
