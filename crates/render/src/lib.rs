//! klock-render: Cairo rendering functions for the klock clock faces.

pub mod digital_face;
pub mod flip_card;
pub mod pango_text;
pub mod progress_bar;

pub use digital_face::{hit_test, render_plain_clock};
pub use flip_card::{layout_row, render_flip_cell, render_flip_row, FlipStyle, Rect, SlotBox};
pub use pango_text::{show_text_centered, FontSpec, TextExtents};
pub use progress_bar::{render_progress_bar, PROGRESS_BAR_HEIGHT};
