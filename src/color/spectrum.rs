use super::Color;
use serde::Deserialize;
use std::str::FromStr;

/// Quantization applied to spectral indexes, bounding drift of long-running index accumulators.
const INDEX_GRANULARITY: f64 = 65_535.0;

/// Largest color list a spectrum accepts
pub const MAX_COLORS: usize = 260;

/// Gamma values are clamped into `[0, MAX_GAMMA]`
pub const MAX_GAMMA: f32 = 3.0;

/// How a color list is laid out over the spectral index range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(try_from = "String")]
#[strum(serialize_all = "lowercase")]
pub enum SpectrumMode {
    /// The list is cyclic: the last zone blends back into the first color.
    #[default]
    Normal,

    /// Black is prepended so the spectrum fades in from dark.
    Light,
}

impl FromStr for SpectrumMode {
    type Err = SpectrumError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "normal" => Ok(Self::Normal),
            "light" => Ok(Self::Light),
            other => Err(SpectrumError::InvalidMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for SpectrumMode {
    type Error = SpectrumError;

    fn try_from(mode: String) -> Result<Self, Self::Error> {
        mode.parse()
    }
}

/// Errors that can occur when building a spectrum
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SpectrumError {
    #[error("invalid spectrum mode '{0}', expected 'normal' or 'light'")]
    InvalidMode(String),

    #[error("a spectrum needs at least one color")]
    NoColors,

    #[error("a spectrum supports at most {MAX_COLORS} colors, got {0}")]
    TooManyColors(usize),
}

/// One sub-interval of `[0, 1)` along with the normalized channels of the two colors it blends.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Zone {
    start: f64,
    end: f64,
    from: [f64; 3],
    to: [f64; 3],
}

impl Zone {
    fn channel(&self, index: f64, channel: usize) -> f64 {
        map_range(index, self.start, self.end, self.from[channel], self.to[channel])
    }
}

/// Converts a spectral index into an RGB color along a list of colors.
///
/// The index range `[0, 1)` is split into one equal-width zone per color; each zone blends
/// linearly from its color into the next one, wrapping around at the end of the list.
#[derive(Clone, Debug)]
pub struct Spectrum {
    colors: Vec<Color>,
    mode: SpectrumMode,
    gamma: f32,
    zones: Vec<Zone>,
}

impl Spectrum {
    /// Build a spectrum over `colors`. Gamma is clamped into `[0, MAX_GAMMA]`.
    pub fn new(colors: &[Color], mode: SpectrumMode, gamma: f32) -> Result<Self, SpectrumError> {
        if colors.is_empty() {
            return Err(SpectrumError::NoColors);
        }
        if colors.len() > MAX_COLORS {
            return Err(SpectrumError::TooManyColors(colors.len()));
        }

        let colors: Vec<Color> = match mode {
            SpectrumMode::Normal => colors.to_vec(),
            SpectrumMode::Light => std::iter::once(Color::BLACK).chain(colors.iter().copied()).collect(),
        };
        let zones = Self::build_zones(&colors);
        Ok(Self {
            colors,
            mode,
            gamma: clamp_gamma(gamma),
            zones,
        })
    }

    /// Build a spectrum from a mode name, failing with [`SpectrumError::InvalidMode`] for unknown names.
    pub fn with_mode_name(colors: &[Color], mode: &str, gamma: f32) -> Result<Self, SpectrumError> {
        Self::new(colors, mode.parse()?, gamma)
    }

    fn build_zones(colors: &[Color]) -> Vec<Zone> {
        let count = colors.len();
        let normalized = |color: Color| [color.r as f64 / 255.0, color.g as f64 / 255.0, color.b as f64 / 255.0];
        (0..count)
            .map(|zone| Zone {
                start: zone as f64 / count as f64,
                end: (zone + 1) as f64 / count as f64,
                from: normalized(colors[zone]),
                to: normalized(colors[(zone + 1) % count]),
            })
            .collect()
    }

    /// Convert a spectral index into a packed `0xRRGGBB` color.
    ///
    /// Only the fractional part of `|index|` matters, so `1.25` and `-0.25` both land on `0.25`.
    pub fn color(&self, index: f64) -> u32 {
        let index = normalize_index(index);
        let count = self.zones.len();
        let zone = ((count as f64 * index) as usize).min(count - 1);
        let zone = &self.zones[zone];

        let channel = |channel: usize| {
            let value = zone.channel(index, channel).powf(self.gamma as f64);
            (value * 255.0).round().clamp(0.0, 255.0) as u32
        };
        (channel(0) << 16) | (channel(1) << 8) | channel(2)
    }

    /// The colors the zones are built from, including the leading black in light mode.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn mode(&self) -> SpectrumMode {
        self.mode
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn set_gamma(&mut self, gamma: f32) {
        self.gamma = clamp_gamma(gamma);
    }
}

fn clamp_gamma(gamma: f32) -> f32 {
    if gamma.is_nan() {
        return 1.0;
    }
    gamma.clamp(0.0, MAX_GAMMA)
}

fn normalize_index(index: f64) -> f64 {
    let normalized = ((index.abs() * INDEX_GRANULARITY) % INDEX_GRANULARITY) / INDEX_GRANULARITY;
    if normalized.is_finite() { normalized } else { 0.0 }
}

/// Map `x` from `[in_min, in_max]` onto `[out_min, out_max]`, constrained to the output range.
fn map_range(x: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let in_range = in_max - in_min;
    let mapped = if in_range != 0.0 { (x - in_min) / in_range } else { 0.5 };
    let mapped = out_min + mapped * (out_max - out_min);
    if out_min <= out_max { mapped.clamp(out_min, out_max) } else { mapped.clamp(out_max, out_min) }
}
