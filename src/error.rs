use thiserror::Error;

use crate::color::Color;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("invalid pixel source: {0}")]
    InvalidInput(String),

    #[error("image height cannot be zero")]
    ZeroHeight,

    #[error("color {0} does not occur in the palette")]
    NotFound(Color),

    #[error("unable to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unable to read image: {0}")]
    Io(#[from] std::io::Error),
}

impl PaletteError {
    /// True for both the general and the zero-height invalid input cases.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PaletteError::InvalidInput(_) | PaletteError::ZeroHeight)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PaletteError::NotFound(_))
    }
}
