//! Flip-card clock rendering
//!
//! Each cell is drawn as four layers, bottom to top:
//! 1. static upper half showing the incoming value
//! 2. static lower half showing the outgoing value
//! 3. fold overlay: the outgoing value's upper half, hinging down to flat
//!    during the first half of the animation
//! 4. unfold overlay: the incoming value's lower half, hinging down from
//!    flat during the second half
//!
//! Overlays exist only while the cell is animating.

use gtk4::cairo;
use std::f64::consts::PI;

use crate::pango_text::{show_text_centered, FontSpec};
use klock_core::{FlipCellSnapshot, FlipRow, FlipSlot};
use klock_types::Color;

/// Card width relative to the font size
const CARD_WIDTH_RATIO: f64 = 0.72;
/// Card height relative to the font size
const CARD_HEIGHT_RATIO: f64 = 1.15;
/// Gap between cards of one group, relative to the font size
const CARD_GAP_RATIO: f64 = 0.06;
/// Width reserved for a ':' separator, relative to the font size
const SEPARATOR_WIDTH_RATIO: f64 = 0.4;
/// Hinge line thickness in pixels
const HINGE_WIDTH: f64 = 2.0;

/// Colors and font for a row of flip cards
#[derive(Debug, Clone, PartialEq)]
pub struct FlipStyle {
    pub digit_color: Color,
    pub card_color: Color,
    pub font: FontSpec,
}

impl FlipStyle {
    /// Cards contrast with the digits: light digits get dark cards and the
    /// other way round
    pub fn for_text_color(text_color: Color, family: &str, size_px: f64) -> Self {
        let luminance = 0.2126 * text_color.r + 0.7152 * text_color.g + 0.0722 * text_color.b;
        let card_color = if luminance > 0.5 {
            Color::new(0.13, 0.13, 0.14, 1.0)
        } else {
            Color::new(0.92, 0.92, 0.90, 1.0)
        };
        Self {
            digit_color: text_color,
            card_color,
            font: FontSpec::new(family, size_px, true),
        }
    }
}

/// Axis-aligned rectangle in widget pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Horizontal placement of one slot of a row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotBox {
    Card(Rect),
    Separator(Rect),
}

/// Lay out a row of slots centered in a `width` x `height` area.
///
/// `is_card[i]` tells whether slot `i` is a card or a separator.
pub fn layout_row(is_card: &[bool], size_px: f64, width: f64, height: f64) -> Vec<SlotBox> {
    let card_w = size_px * CARD_WIDTH_RATIO;
    let card_h = size_px * CARD_HEIGHT_RATIO;
    let gap = size_px * CARD_GAP_RATIO;
    let sep_w = size_px * SEPARATOR_WIDTH_RATIO;

    let total: f64 = is_card
        .iter()
        .map(|&card| if card { card_w } else { sep_w })
        .sum::<f64>()
        + gap * is_card.len().saturating_sub(1) as f64;

    let y = (height - card_h) / 2.0;
    let mut x = (width - total) / 2.0;
    is_card
        .iter()
        .map(|&card| {
            let w = if card { card_w } else { sep_w };
            let rect = Rect {
                x,
                y,
                width: w,
                height: card_h,
            };
            x += w + gap;
            if card {
                SlotBox::Card(rect)
            } else {
                SlotBox::Separator(rect)
            }
        })
        .collect()
}

/// Render a full row of flip cells centered in the area
pub fn render_flip_row(
    cr: &cairo::Context,
    row: &FlipRow,
    style: &FlipStyle,
    width: f64,
    height: f64,
) -> Result<(), cairo::Error> {
    let slots = row.slots();
    let is_card: Vec<bool> = slots.iter().map(|s| matches!(s, FlipSlot::Cell(_))).collect();
    let boxes = layout_row(&is_card, style.font.size_px, width, height);

    for (slot, slot_box) in slots.iter().zip(boxes) {
        match (slot, slot_box) {
            (FlipSlot::Cell(cell), SlotBox::Card(rect)) => {
                render_flip_cell(cr, &cell.snapshot(), style, rect)?;
            }
            (FlipSlot::Separator(c), SlotBox::Separator(rect)) => {
                let (cx, cy) = rect.center();
                cr.save()?;
                style.digit_color.apply_to_cairo(cr);
                show_text_centered(cr, &c.to_string(), &style.font, cx, cy);
                cr.restore()?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Render one cell's four layers into `rect`
pub fn render_flip_cell(
    cr: &cairo::Context,
    snapshot: &FlipCellSnapshot,
    style: &FlipStyle,
    rect: Rect,
) -> Result<(), cairo::Error> {
    let half = rect.height / 2.0;
    let hinge_y = rect.y + half;

    // Static layers
    draw_half(cr, snapshot.upper, style, rect, Half::Upper, 1.0, 0.0)?;
    draw_half(cr, snapshot.lower, style, rect, Half::Lower, 1.0, 0.0)?;

    // Overlays: the fold flattens over the first half of the animation, the
    // unfold opens over the second
    let p = snapshot.progress.clamp(0.0, 1.0);
    if let Some(fold) = snapshot.fold {
        if p < 0.5 {
            let scale = (p * PI).cos();
            draw_half(cr, fold, style, rect, Half::Upper, scale, -0.35 * (1.0 - scale))?;
        }
    }
    if let Some(unfold) = snapshot.unfold {
        if p >= 0.5 {
            let scale = -(p * PI).cos();
            draw_half(cr, unfold, style, rect, Half::Lower, scale, -0.25 * (1.0 - scale))?;
        }
    }

    // Hinge line across the middle
    cr.save()?;
    style.card_color.shade(-0.5).apply_to_cairo(cr);
    cr.rectangle(rect.x, hinge_y - HINGE_WIDTH / 2.0, rect.width, HINGE_WIDTH);
    cr.fill()?;
    cr.restore()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Half {
    Upper,
    Lower,
}

/// Draw one half card with its half of the glyph, squashed vertically
/// toward the hinge by `scale` and darkened by `shade`
fn draw_half(
    cr: &cairo::Context,
    value: char,
    style: &FlipStyle,
    rect: Rect,
    half: Half,
    scale: f64,
    shade: f64,
) -> Result<(), cairo::Error> {
    if scale <= 0.001 {
        return Ok(());
    }
    let half_h = rect.height / 2.0;
    let hinge_y = rect.y + half_h;
    let radius = (rect.width * 0.08).min(half_h);

    cr.save()?;
    // Squash around the hinge line
    cr.translate(0.0, hinge_y);
    cr.scale(1.0, scale);
    cr.translate(0.0, -hinge_y);

    let clip_y = match half {
        Half::Upper => rect.y,
        Half::Lower => hinge_y,
    };
    cr.rectangle(rect.x, clip_y, rect.width, half_h);
    cr.clip();

    style.card_color.shade(shade).apply_to_cairo(cr);
    rounded_rectangle(cr, rect.x, rect.y, rect.width, rect.height, radius);
    cr.fill()?;

    let (cx, cy) = rect.center();
    style.digit_color.apply_to_cairo(cr);
    show_text_centered(cr, &value.to_string(), &style.font, cx, cy);

    cr.restore()?;
    Ok(())
}

fn rounded_rectangle(cr: &cairo::Context, x: f64, y: f64, w: f64, h: f64, r: f64) {
    cr.new_sub_path();
    cr.arc(x + w - r, y + r, r, -PI / 2.0, 0.0);
    cr.arc(x + w - r, y + h - r, r, 0.0, PI / 2.0);
    cr.arc(x + r, y + h - r, r, PI / 2.0, PI);
    cr.arc(x + r, y + r, r, PI, 3.0 * PI / 2.0);
    cr.close_path();
}
