use image::{DynamicImage, GenericImageView, Pixel, RgbImage, RgbaImage};
use palette::Srgb;

use crate::color::Color;
use crate::error::PaletteError;

// ------------------------------------------------------------
// Grid sources (random access by coordinate)
// ------------------------------------------------------------

/// What a grid source stores at a coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridPixel {
    /// Direct color.
    Rgb(Srgb<u8>),
    /// Index into the source's color table.
    Index(u8),
}

/// Turns [`GridPixel`]s into packed colors.
///
/// A source picks its resolver once; the scan never branches on the source kind per pixel.
#[derive(Clone, Copy, Debug)]
pub enum ColorResolver<'a> {
    /// Pixels carry their RGB value.
    Direct,
    /// Pixels carry an index into this table.
    Indexed(&'a [Srgb<u8>]),
}

impl ColorResolver<'_> {
    /// Look up a table entry. Always `None` for a direct resolver.
    pub fn resolve_index(&self, index: u8) -> Option<Srgb<u8>> {
        match self {
            ColorResolver::Direct => None,
            ColorResolver::Indexed(table) => table.get(index as usize).copied(),
        }
    }

    /// Fails when the pixel representation does not match the resolver, which means the
    /// source handed out something it never promised.
    pub fn resolve(&self, pixel: GridPixel) -> Result<Color, PaletteError> {
        match (self, pixel) {
            (ColorResolver::Direct, GridPixel::Rgb(rgb)) => Ok(rgb.into()),
            (ColorResolver::Indexed(table), GridPixel::Index(index)) => self
                .resolve_index(index)
                .map(Color::from)
                .ok_or_else(|| {
                    PaletteError::InvalidInput(format!(
                        "palette index {index} is outside a table of {} colors",
                        table.len()
                    ))
                }),
            (ColorResolver::Direct, GridPixel::Index(index)) => Err(PaletteError::InvalidInput(
                format!("direct-color source produced palette index {index}"),
            )),
            (ColorResolver::Indexed(_), GridPixel::Rgb(rgb)) => {
                Err(PaletteError::InvalidInput(format!(
                    "indexed source produced direct color {}",
                    Color::from(rgb)
                )))
            }
        }
    }
}

/// A pixel grid with random access by `(x, y)`.
pub trait GridSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// `x < width()` and `y < height()` are guaranteed by callers in this crate.
    fn color_at(&self, x: u32, y: u32) -> GridPixel;

    fn resolver(&self) -> ColorResolver<'_> {
        ColorResolver::Direct
    }
}

#[inline(always)]
fn view_pixel<I>(image: &I, x: u32, y: u32) -> Srgb<u8>
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = u8>,
{
    let rgb = GenericImageView::get_pixel(image, x, y).to_rgb();
    Srgb::new(rgb[0], rgb[1], rgb[2])
}

macro_rules! direct_grid_source {
    ($($ty:ty),*) => {$(
        impl GridSource for $ty {
            fn width(&self) -> u32 {
                GenericImageView::width(self)
            }

            fn height(&self) -> u32 {
                GenericImageView::height(self)
            }

            fn color_at(&self, x: u32, y: u32) -> GridPixel {
                GridPixel::Rgb(view_pixel(self, x, y))
            }
        }
    )*};
}

direct_grid_source!(DynamicImage, RgbImage, RgbaImage);

/// A palette-mapped image: one index byte per pixel plus an RGB lookup table.
///
/// The `image` crate expands indexed PNG/GIF data to truecolor while decoding, so callers
/// holding raw indices (from `gif`, `png` with `Transformations::IDENTITY`, a sprite sheet,
/// ...) build one of these to count by table entry instead.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    indices: Vec<u8>,
    table: Vec<Srgb<u8>>,
}

impl IndexedImage {
    /// Indices are row-major. Fails if the buffer does not hold exactly `width * height`
    /// indices or if any index points past the table.
    pub fn new(
        width: u32,
        height: u32,
        indices: Vec<u8>,
        table: Vec<Srgb<u8>>,
    ) -> Result<Self, PaletteError> {
        let expected = width as usize * height as usize;
        if indices.len() != expected {
            return Err(PaletteError::InvalidInput(format!(
                "index buffer length {} does not match dimensions {width}x{height}",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= table.len()) {
            return Err(PaletteError::InvalidInput(format!(
                "palette index {bad} is outside a table of {} colors",
                table.len()
            )));
        }
        Ok(Self {
            width,
            height,
            indices,
            table,
        })
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn table(&self) -> &[Srgb<u8>] {
        &self.table
    }
}

impl GridSource for IndexedImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn color_at(&self, x: u32, y: u32) -> GridPixel {
        GridPixel::Index(self.indices[y as usize * self.width as usize + x as usize])
    }

    fn resolver(&self) -> ColorResolver<'_> {
        ColorResolver::Indexed(&self.table)
    }
}

// ------------------------------------------------------------
// Row sources (sequential, row by row)
// ------------------------------------------------------------

/// A pixel source read one row at a time, top to bottom.
///
/// Each call to [`rows`](RowSource::rows) starts again from the first row.
pub trait RowSource {
    fn height(&self) -> u32;

    fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = Srgb<u8>>>;
}

fn view_rows<I>(image: &I) -> impl Iterator<Item = impl Iterator<Item = Srgb<u8>>>
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    (0..height).map(move |y| (0..width).map(move |x| view_pixel(image, x, y)))
}

macro_rules! direct_row_source {
    ($($ty:ty),*) => {$(
        impl RowSource for $ty {
            fn height(&self) -> u32 {
                GenericImageView::height(self)
            }

            fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = Srgb<u8>>> {
                view_rows(self)
            }
        }
    )*};
}

direct_row_source!(DynamicImage, RgbImage, RgbaImage);
