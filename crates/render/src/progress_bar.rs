//! Klock-mode minute progress bar

use gtk4::cairo;

use klock_types::Color;

/// Bar height in pixels
pub const PROGRESS_BAR_HEIGHT: f64 = 6.0;

/// Draw a full-width bar along the bottom edge, filled to `fraction`
pub fn render_progress_bar(
    cr: &cairo::Context,
    fraction: f64,
    color: Color,
    width: f64,
    height: f64,
) -> Result<(), cairo::Error> {
    let fraction = fraction.clamp(0.0, 1.0);
    let y = height - PROGRESS_BAR_HEIGHT;

    cr.save()?;
    // Track
    color.with_alpha(color.a * 0.15).apply_to_cairo(cr);
    cr.rectangle(0.0, y, width, PROGRESS_BAR_HEIGHT);
    cr.fill()?;

    if fraction > 0.0 {
        color.apply_to_cairo(cr);
        cr.rectangle(0.0, y, width * fraction, PROGRESS_BAR_HEIGHT);
        cr.fill()?;
    }
    cr.restore()?;
    Ok(())
}
