//! Pango-based text rendering
//!
//! Cairo's toy font API (select_font_face, show_text, text_extents) creates
//! internal font caches that grow unboundedly over a long-running session,
//! and a desk clock runs for days. All clock text goes through Pango
//! instead, with font descriptions cached per (family, size, weight).

use gtk4::cairo::Context;
use pango::{FontDescription, Weight as PangoWeight};
use pangocairo::functions::{create_layout, show_layout};
use std::cell::RefCell;
use std::collections::HashMap;

/// Font request for clock text
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Pango family list, e.g. "Georgia, Serif"
    pub family: String,
    /// Absolute size in device pixels
    pub size_px: f64,
    pub bold: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size_px: f64, bold: bool) -> Self {
        Self {
            family: family.into(),
            size_px,
            bold,
        }
    }
}

/// Logical text extents in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextExtents {
    pub width: f64,
    pub height: f64,
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
struct FontKey {
    family: String,
    size_pango: i32, // Absolute size in Pango units (pixels * PANGO_SCALE)
    bold: bool,
}

impl FontKey {
    fn new(font: &FontSpec) -> Self {
        Self {
            family: font.family.clone(),
            size_pango: (font.size_px.max(1.0) * pango::SCALE as f64) as i32,
            bold: font.bold,
        }
    }
}

/// Cache for FontDescription objects to avoid repeated allocations
struct FontDescriptionCache {
    cache: HashMap<FontKey, FontDescription>,
    max_entries: usize,
}

impl FontDescriptionCache {
    fn new() -> Self {
        Self {
            cache: HashMap::new(),
            max_entries: 32,
        }
    }

    fn get_or_create(&mut self, font: &FontSpec) -> FontDescription {
        let key = FontKey::new(font);
        if let Some(desc) = self.cache.get(&key) {
            return desc.clone();
        }

        // Size changes with every window resize; drop everything when full
        if self.cache.len() >= self.max_entries {
            log::debug!("Font description cache full, clearing {} entries", self.cache.len());
            self.cache.clear();
        }

        let mut desc = FontDescription::from_string(&key.family);
        desc.set_absolute_size(key.size_pango as f64);
        desc.set_weight(if key.bold {
            PangoWeight::Bold
        } else {
            PangoWeight::Normal
        });

        self.cache.insert(key, desc.clone());
        desc
    }
}

thread_local! {
    static FONT_DESC_CACHE: RefCell<FontDescriptionCache> = RefCell::new(FontDescriptionCache::new());
}

fn layout_for(cr: &Context, text: &str, font: &FontSpec) -> pango::Layout {
    let desc = FONT_DESC_CACHE.with(|cache| cache.borrow_mut().get_or_create(font));
    let layout = create_layout(cr);
    layout.set_font_description(Some(&desc));
    layout.set_text(text);
    layout
}

fn logical_extents(layout: &pango::Layout) -> TextExtents {
    let (_ink, logical) = layout.extents();
    let scale = pango::SCALE as f64;
    TextExtents {
        width: logical.width() as f64 / scale,
        height: logical.height() as f64 / scale,
    }
}

/// Draw `text` with its logical box centered on (cx, cy), in the current source
pub fn show_text_centered(cr: &Context, text: &str, font: &FontSpec, cx: f64, cy: f64) -> TextExtents {
    let layout = layout_for(cr, text, font);
    let extents = logical_extents(&layout);
    cr.move_to(cx - extents.width / 2.0, cy - extents.height / 2.0);
    show_layout(cr, &layout);
    extents
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_key_rounds_to_pango_units() {
        let a = FontKey::new(&FontSpec::new("Sans", 96.0, true));
        let b = FontKey::new(&FontSpec::new("Sans", 96.0, true));
        assert_eq!(a, b);
        assert_eq!(a.size_pango, 96 * pango::SCALE);
    }

    #[test]
    fn test_font_key_never_zero_size() {
        let key = FontKey::new(&FontSpec::new("Sans", 0.0, false));
        assert_eq!(key.size_pango, pango::SCALE);
    }
}
