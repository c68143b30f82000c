//! Frequency-ranked color palettes for raster images.
//!
//! A [`Palette`] maps every exact 24-bit color found in an image to the number of pixels
//! carrying it, sorted most used first. Decoding is left to the `image` crate; this crate
//! only walks the decoded pixels, either all of them through a [`GridSource`] or a
//! systematic sample of rows through a [`RowSource`].

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

pub mod color;
pub mod error;
pub mod palette;
pub mod source;

pub use crate::color::Color;
pub use crate::error::PaletteError;
pub use crate::palette::{Palette, SAMPLED_ROWS};
pub use crate::source::{ColorResolver, GridPixel, GridSource, IndexedImage, RowSource};

/// Count the colors of an encoded image and return the most used ones.
///
/// The result is a JS array of `{ color: "RRGGBB", count }` objects, most used first, with
/// at most `limit` entries (all colors when `limit` is absent).
#[wasm_bindgen]
pub fn extract_palette(input: Vec<u8>, limit: Option<usize>) -> Result<Array, JsValue> {
    let palette = Palette::from_bytes(&input).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let out = Array::new();
    for (color, count) in palette.most_used_colors(limit) {
        let entry = Object::new();
        Reflect::set(&entry, &JsValue::from_str("color"), &JsValue::from_str(&color.to_hex()))?;
        Reflect::set(&entry, &JsValue::from_str("count"), &JsValue::from_f64(count as f64))?;
        out.push(&entry);
    }
    Ok(out)
}
