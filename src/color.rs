use palette::{LinSrgb, Mix, Srgb};

/// Core color type used throughout the engine.
/// Wraps sRGB u8 components and provides conversions to linear light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800`, `#FF8800` or `ff8800`.
    ///
    /// Anything other than an optional `#` followed by exactly six hex digits
    /// yields `None`, so callers can pass malformed entries through untouched.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Build a color from wide integer channels, clamping each to [0, 255].
    pub fn from_channels_clamped(r: i32, g: i32, b: i32) -> Self {
        let clamp = |c: i32| c.clamp(0, 255) as u8;
        Self {
            r: clamp(r),
            g: clamp(g),
            b: clamp(b),
        }
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to `palette::Srgb<u8>`.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// Decode the gamma-encoded bytes into linear light.
    ///
    /// Uses the piecewise sRGB transfer function (linear segment below 0.04045,
    /// 2.4 power curve above).
    pub fn to_linear(self) -> LinSrgb<f32> {
        self.to_srgb_u8().into_format::<f32>().into_linear()
    }

    /// Re-encode a linear-light color, clamping and rounding to bytes.
    pub fn from_linear(linear: LinSrgb<f32>) -> Self {
        let srgb: Srgb<f32> = Srgb::from_linear(linear);
        Self::from_srgb_f32_clamped(srgb)
    }

    /// Scale an Srgb<f32> to bytes, rounding and clamping out-of-gamut channels.
    fn from_srgb_f32_clamped(srgb: Srgb<f32>) -> Self {
        let scale = |c: f32| (c * 255.0).round() as i32;
        Self::from_channels_clamped(scale(srgb.red), scale(srgb.green), scale(srgb.blue))
    }

    /// Blend towards `other` in linear light. `t` is clamped to [0, 1].
    pub fn mix_linear(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color::from_linear(self.to_linear().mix(other.to_linear(), t))
    }

    /// WCAG 2.0 relative luminance.
    pub fn relative_luminance(self) -> f32 {
        let lin = self.to_linear();
        0.2126 * lin.red + 0.7152 * lin.green + 0.0722 * lin.blue
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Interpolate two hex colors in linear light and return the result as hex.
///
/// A malformed input never halts a transition: if `a` is not a valid
/// `#rrggbb` color, `b` is returned verbatim, and vice versa.
pub fn interpolate(a: &str, b: &str, t: f32) -> String {
    match (Color::from_hex(a), Color::from_hex(b)) {
        (Some(ca), Some(cb)) => ca.mix_linear(cb, t).to_hex(),
        (Some(_), None) => a.to_string(),
        (None, _) => b.to_string(),
    }
}
