use std::fmt;

use palette::Srgb;

/// A 24-bit RGB color packed as `0xRRGGBB`.
///
/// This is the key a [`Palette`](crate::Palette) counts pixels under. There is no alpha
/// channel; sources carrying alpha drop it before packing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);

    /// Pack three 8-bit channels.
    #[inline(always)]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color((r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Bits above the low 24 are discarded.
    #[inline(always)]
    pub const fn from_packed(value: u32) -> Self {
        Color(value & 0xFF_FFFF)
    }

    pub const fn packed(self) -> u32 {
        self.0
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    pub const fn channels(self) -> (u8, u8, u8) {
        (self.red(), self.green(), self.blue())
    }

    /// Upper-case hex without the leading `#`, e.g. `FF8800`.
    pub fn to_hex(self) -> String {
        format!("{:06X}", self.0)
    }
}

impl From<Srgb<u8>> for Color {
    fn from(rgb: Srgb<u8>) -> Self {
        Color::from_rgb(rgb.red, rgb.green, rgb.blue)
    }
}

impl From<Color> for Srgb<u8> {
    fn from(color: Color) -> Self {
        Srgb::new(color.red(), color.green(), color.blue())
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(pixel: image::Rgb<u8>) -> Self {
        Color::from_rgb(pixel[0], pixel[1], pixel[2])
    }
}

impl From<image::Rgba<u8>> for Color {
    fn from(pixel: image::Rgba<u8>) -> Self {
        Color::from_rgb(pixel[0], pixel[1], pixel[2])
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Color::from_packed(value)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}
