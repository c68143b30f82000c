use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use image::DynamicImage;
use log::debug;

use crate::color::Color;
use crate::error::PaletteError;
use crate::source::{GridSource, RowSource};

/// The sampled path reads roughly this many rows, however tall the image is.
pub const SAMPLED_ROWS: u32 = 50;

/// Pixel counts per distinct color, most used first.
///
/// Built in a single pass over a pixel source and never modified afterwards. Colors with
/// equal counts keep the order in which the scan first met them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<(Color, usize)>,
    positions: HashMap<Color, usize>,
}

/// Insert-or-increment counter that remembers first-seen order.
///
/// `slots` maps a color to its entry in `entries`, so each pixel costs one hash lookup
/// (amortized O(1)) and `entries` stays in encounter order for the stable sort.
#[derive(Default)]
struct ColorCounter {
    entries: Vec<(Color, usize)>,
    slots: HashMap<Color, usize>,
}

impl ColorCounter {
    #[inline(always)]
    fn add(&mut self, color: Color) {
        match self.slots.entry(color) {
            Entry::Occupied(slot) => self.entries[*slot.get()].1 += 1,
            Entry::Vacant(slot) => {
                slot.insert(self.entries.len());
                self.entries.push((color, 1));
            }
        }
    }

    fn into_palette(self) -> Palette {
        let mut colors = self.entries;
        // `sort_by` is stable: ties stay in encounter order.
        colors.sort_by(|a, b| b.1.cmp(&a.1));
        let positions = colors
            .iter()
            .enumerate()
            .map(|(i, &(color, _))| (color, i))
            .collect();
        Palette { colors, positions }
    }
}

impl Palette {
    /// Count every pixel of a grid source.
    ///
    /// The scan runs column by column: outer loop over `x`, inner loop over `y`. That order
    /// decides which of two equally common colors comes first.
    ///
    /// Fails with [`PaletteError::InvalidInput`] if the source yields a pixel its resolver
    /// cannot turn into a color (an index on a direct source, or an index past the table).
    pub fn from_grid<S: GridSource + ?Sized>(source: &S) -> Result<Self, PaletteError> {
        let (width, height) = (source.width(), source.height());
        let resolver = source.resolver();

        let mut counter = ColorCounter::default();
        for x in 0..width {
            for y in 0..height {
                counter.add(resolver.resolve(source.color_at(x, y))?);
            }
        }

        let palette = counter.into_palette();
        debug!(
            "full scan of {width}x{height} grid found {} distinct colors",
            palette.len()
        );
        Ok(palette)
    }

    /// Count the pixels of every `step`-th row, starting with row 0, where
    /// `step = ceil(height / SAMPLED_ROWS)`.
    ///
    /// Bounds the work to about `SAMPLED_ROWS * width` pixels for any height. Fails with
    /// [`PaletteError::ZeroHeight`] for an empty image.
    pub fn from_rows<S: RowSource + ?Sized>(source: &S) -> Result<Self, PaletteError> {
        let height = source.height();
        if height == 0 {
            return Err(PaletteError::ZeroHeight);
        }
        let step = height.div_ceil(SAMPLED_ROWS) as usize;

        let mut counter = ColorCounter::default();
        let mut sampled = 0usize;
        for (row_index, row) in source.rows().enumerate() {
            if row_index % step != 0 {
                continue;
            }
            sampled += 1;
            for pixel in row {
                counter.add(pixel.into());
            }
        }

        let palette = counter.into_palette();
        debug!(
            "sampled {sampled} of {height} rows (step {step}), found {} distinct colors",
            palette.len()
        );
        Ok(palette)
    }

    /// Full scan of an already decoded image.
    pub fn from_image(image: &DynamicImage) -> Result<Self, PaletteError> {
        Self::from_grid(image)
    }

    /// Decode an encoded image (any format the `image` crate reads) and scan all of it.
    pub fn from_bytes(input: &[u8]) -> Result<Self, PaletteError> {
        let image = image::load_from_memory(input)?;
        Self::from_image(&image)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PaletteError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!("read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes(&bytes)
    }

    /// Number of distinct colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Number of pixels counted; less than the image area when rows were sampled.
    pub fn total_pixels(&self) -> usize {
        self.colors.iter().map(|&(_, count)| count).sum()
    }

    /// `(color, count)` pairs, most used first. Every call starts from the top.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, (Color, usize)>> {
        self.colors.iter().copied()
    }

    pub fn contains(&self, color: Color) -> bool {
        self.positions.contains_key(&color)
    }

    /// Pixel count for `color`, or [`PaletteError::NotFound`] if the scan never saw it.
    pub fn color_count(&self, color: Color) -> Result<usize, PaletteError> {
        self.positions
            .get(&color)
            .map(|&i| self.colors[i].1)
            .ok_or(PaletteError::NotFound(color))
    }

    /// The `limit` most used colors, or all of them for `None`.
    pub fn most_used_colors(&self, limit: Option<usize>) -> Vec<(Color, usize)> {
        let end = limit.map_or(self.colors.len(), |n| n.min(self.colors.len()));
        self.colors[..end].to_vec()
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = (Color, usize);
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, (Color, usize)>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ColorResolver, GridPixel, IndexedImage};
    use palette::Srgb;

    /// Row-major grid over plain RGB triples.
    struct TestGrid {
        width: u32,
        height: u32,
        pixels: Vec<(u8, u8, u8)>,
    }

    impl GridSource for TestGrid {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn color_at(&self, x: u32, y: u32) -> GridPixel {
            let (r, g, b) = self.pixels[(y * self.width + x) as usize];
            GridPixel::Rgb(Srgb::new(r, g, b))
        }
    }

    /// Claims to be indexed but hands out direct colors.
    struct LyingGrid;

    impl GridSource for LyingGrid {
        fn width(&self) -> u32 {
            1
        }

        fn height(&self) -> u32 {
            1
        }

        fn color_at(&self, _x: u32, _y: u32) -> GridPixel {
            GridPixel::Rgb(Srgb::new(0, 0, 0))
        }

        fn resolver(&self) -> ColorResolver<'_> {
            ColorResolver::Indexed(&[])
        }
    }

    struct TestRows {
        width: usize,
        rows: Vec<Srgb<u8>>,
    }

    impl TestRows {
        /// One color per row.
        fn striped(width: usize, row_colors: &[(u8, u8, u8)]) -> Self {
            Self {
                width,
                rows: row_colors.iter().map(|&(r, g, b)| Srgb::new(r, g, b)).collect(),
            }
        }
    }

    impl RowSource for TestRows {
        fn height(&self) -> u32 {
            self.rows.len() as u32
        }

        fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = Srgb<u8>>> {
            self.rows
                .iter()
                .map(|&c| std::iter::repeat(c).take(self.width))
        }
    }

    fn red() -> Color {
        Color::from_rgb(255, 0, 0)
    }

    fn green() -> Color {
        Color::from_rgb(0, 255, 0)
    }

    fn blue() -> Color {
        Color::from_rgb(0, 0, 255)
    }

    #[test]
    fn two_by_two_grid() {
        let grid = TestGrid {
            width: 2,
            height: 2,
            pixels: vec![(255, 0, 0), (255, 0, 0), (0, 255, 0), (0, 0, 255)],
        };
        let palette = Palette::from_grid(&grid).unwrap();

        assert_eq!(palette.len(), 3);
        // Column-major scan meets green at (0, 1) before blue at (1, 1).
        assert_eq!(
            palette.iter().collect::<Vec<_>>(),
            vec![(red(), 2), (green(), 1), (blue(), 1)]
        );
        assert_eq!(palette.most_used_colors(Some(1)), vec![(red(), 2)]);
        assert_eq!(palette.total_pixels(), 4);
    }

    #[test]
    fn ties_keep_column_major_encounter_order() {
        // (0,0)=blue (1,0)=red / (0,1)=red (1,1)=blue: blue is met first.
        let grid = TestGrid {
            width: 2,
            height: 2,
            pixels: vec![(0, 0, 255), (255, 0, 0), (255, 0, 0), (0, 0, 255)],
        };
        let palette = Palette::from_grid(&grid).unwrap();
        assert_eq!(
            palette.most_used_colors(None),
            vec![(blue(), 2), (red(), 2)]
        );
    }

    #[test]
    fn empty_grid_gives_empty_palette() {
        let grid = TestGrid {
            width: 0,
            height: 3,
            pixels: vec![],
        };
        let palette = Palette::from_grid(&grid).unwrap();
        assert!(palette.is_empty());
        assert!(palette.most_used_colors(Some(5)).is_empty());
    }

    #[test]
    fn indexed_grid_resolves_through_table() {
        let table = vec![Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)];
        let img = IndexedImage::new(3, 2, vec![1, 1, 0, 1, 1, 1], table).unwrap();
        let palette = Palette::from_grid(&img).unwrap();
        assert_eq!(palette.color_count(Color::WHITE).unwrap(), 5);
        assert_eq!(palette.color_count(Color::BLACK).unwrap(), 1);
        // Raw index values never show up as colors.
        assert!(!palette.contains(Color::from_packed(1)));
    }

    #[test]
    fn mismatched_resolver_is_invalid_input() {
        let err = Palette::from_grid(&LyingGrid).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn sampled_black_rows() {
        let rows = TestRows::striped(10, &[(0, 0, 0); 100]);
        let palette = Palette::from_rows(&rows).unwrap();
        assert_eq!(palette.most_used_colors(None), vec![(Color::BLACK, 500)]);
    }

    #[test]
    fn sampled_rows_start_at_zero_and_skip_by_step() {
        // Height 120 gives step 3: rows 0, 3, 6, ... are read.
        let colors: Vec<(u8, u8, u8)> = (0..120u32).map(|y| (y as u8, 0, 0)).collect();
        let rows = TestRows::striped(4, &colors);
        let palette = Palette::from_rows(&rows).unwrap();

        assert_eq!(palette.len(), 40);
        assert_eq!(palette.total_pixels(), 40 * 4);
        assert_eq!(palette.color_count(Color::from_rgb(0, 0, 0)).unwrap(), 4);
        assert_eq!(palette.color_count(Color::from_rgb(117, 0, 0)).unwrap(), 4);
        assert!(palette.color_count(Color::from_rgb(1, 0, 0)).unwrap_err().is_not_found());
    }

    #[test]
    fn sampled_row_count_matches_ceil_formula() {
        for height in [1u32, 2, 49, 50, 51, 99, 100, 101, 149, 1000, 1234] {
            let step = height.div_ceil(SAMPLED_ROWS);
            let rows = TestRows::striped(3, &vec![(9, 9, 9); height as usize]);
            let palette = Palette::from_rows(&rows).unwrap();
            let expected_rows = height.div_ceil(step) as usize;
            assert_eq!(palette.total_pixels(), expected_rows * 3, "height {height}");
        }
    }

    #[test]
    fn zero_height_rows_is_invalid_input() {
        let rows = TestRows::striped(10, &[]);
        let err = Palette::from_rows(&rows).unwrap_err();
        assert!(matches!(err, PaletteError::ZeroHeight));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn missing_color_is_not_found() {
        let grid = TestGrid {
            width: 1,
            height: 1,
            pixels: vec![(1, 2, 3)],
        };
        let palette = Palette::from_grid(&grid).unwrap();
        match palette.color_count(Color::from_rgb(3, 2, 1)) {
            Err(PaletteError::NotFound(c)) => assert_eq!(c, Color::from_rgb(3, 2, 1)),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn iteration_restarts_and_matches_into_iter() {
        let grid = TestGrid {
            width: 3,
            height: 1,
            pixels: vec![(1, 1, 1), (2, 2, 2), (1, 1, 1)],
        };
        let palette = Palette::from_grid(&grid).unwrap();
        let first: Vec<_> = palette.iter().collect();
        let second: Vec<_> = (&palette).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), palette.len());
    }
}
