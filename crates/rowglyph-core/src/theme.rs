//! Theme detection from the host page's computed text color.
//!
//! Host pages rarely expose their theme directly. The body text color is a
//! reliable proxy: dark text means a light background and vice versa.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Theme;

static RGB_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^rgba?\([ ]*([0-9]{1,3})[ ]*,[ ]*([0-9]{1,3})[ ]*,[ ]*([0-9]{1,3})[ ]*(?:,[ ]*([0-9.]+)[ ]*)?\)$",
    )
    .expect("valid color pattern")
});

/// An sRGB color with alpha in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    /// Parse a computed-style color (`rgb(…)` or `rgba(…)`).
    pub fn parse(value: &str) -> Option<Self> {
        let caps = RGB_PATTERN.captures(value.trim())?;
        let channel = |i: usize| caps.get(i)?.as_str().parse::<u8>().ok();
        let alpha = match caps.get(4) {
            Some(a) => a.as_str().parse::<f32>().ok()?.clamp(0.0, 1.0),
            None => 1.0,
        };

        Some(Self {
            r: channel(1)?,
            g: channel(2)?,
            b: channel(3)?,
            a: alpha,
        })
    }

    /// Relative luminance (WCAG), `0.0` black to `1.0` white.
    pub fn luminance(&self) -> f32 {
        fn linear(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.039_28 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }
}

/// Derive the page theme from its body text color.
///
/// `light_text_color` is the exact value a provider knows its light theme
/// uses. Other values fall back to luminance; anything unparseable yields
/// [`Theme::default`].
pub fn theme_from_text_color(color: Option<&str>, light_text_color: Option<&str>) -> Theme {
    let Some(color) = color.map(str::trim).filter(|c| !c.is_empty()) else {
        return Theme::default();
    };

    if light_text_color.is_some_and(|light| light.trim() == color) {
        return Theme::Light;
    }

    match Rgba::parse(color) {
        Some(rgba) if rgba.luminance() < 0.5 => Theme::Light,
        Some(_) => Theme::Dark,
        None => Theme::default(),
    }
}
