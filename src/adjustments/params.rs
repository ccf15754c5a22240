/// Inclusive numeric range of a slider-backed parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl ParamRange {
    const fn new(min: f64, max: f64, step: f64, default: f64) -> Self {
        Self {
            min,
            max,
            step,
            default,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

const BLUR_RANGE: ParamRange = ParamRange::new(0.0, 100.0, 1.0, 0.0);
const SHARPEN_RANGE: ParamRange = ParamRange::new(0.0, 5.0, 0.1, 0.0);
const PIXELATE_RANGE: ParamRange = ParamRange::new(0.0, 100.0, 1.0, 0.0);
const BRIGHTNESS_RANGE: ParamRange = ParamRange::new(-255.0, 255.0, 1.0, 0.0);
const CONTRAST_RANGE: ParamRange = ParamRange::new(-255.0, 255.0, 1.0, 0.0);
const SATURATION_RANGE: ParamRange = ParamRange::new(0.0, 200.0, 1.0, 100.0);
const GAMMA_RANGE: ParamRange = ParamRange::new(50.0, 200.0, 1.0, 100.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjustmentKey {
    Blur,
    Sharpen,
    Pixelate,
    Monochrome,
    Brightness,
    Contrast,
    Saturation,
    Gamma,
}

impl AdjustmentKey {
    pub const ALL: [AdjustmentKey; 8] = [
        AdjustmentKey::Blur,
        AdjustmentKey::Sharpen,
        AdjustmentKey::Pixelate,
        AdjustmentKey::Monochrome,
        AdjustmentKey::Brightness,
        AdjustmentKey::Contrast,
        AdjustmentKey::Saturation,
        AdjustmentKey::Gamma,
    ];

    /// Slider range; `None` for the monochrome toggle.
    pub const fn range(self) -> Option<ParamRange> {
        match self {
            Self::Blur => Some(BLUR_RANGE),
            Self::Sharpen => Some(SHARPEN_RANGE),
            Self::Pixelate => Some(PIXELATE_RANGE),
            Self::Brightness => Some(BRIGHTNESS_RANGE),
            Self::Contrast => Some(CONTRAST_RANGE),
            Self::Saturation => Some(SATURATION_RANGE),
            Self::Gamma => Some(GAMMA_RANGE),
            Self::Monochrome => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Blur => "Gaussian blur",
            Self::Sharpen => "Sharpen",
            Self::Pixelate => "Pixelate",
            Self::Monochrome => "Monochrome",
            Self::Brightness => "Brightness",
            Self::Contrast => "Contrast",
            Self::Saturation => "Saturation",
            Self::Gamma => "Gamma",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::Blur | Self::Pixelate => "px",
            _ => "",
        }
    }

    pub fn default_value(self) -> AdjustmentValue {
        match self.range() {
            Some(range) => AdjustmentValue::Amount(range.default),
            None => AdjustmentValue::Toggle(false),
        }
    }

    /// Value as shown next to the slider; saturation reads as a multiplier.
    pub fn display_value(self, value: f64) -> f64 {
        match self {
            Self::Saturation => value / 100.0,
            _ => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustmentValue {
    Amount(f64),
    Toggle(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filters {
    pub blur: f64,
    pub sharpen: f64,
    pub pixelate: f64,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            blur: BLUR_RANGE.default,
            sharpen: SHARPEN_RANGE.default,
            pixelate: PIXELATE_RANGE.default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAdjustments {
    pub monochrome: bool,
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub gamma: f64,
}

impl Default for ColorAdjustments {
    fn default() -> Self {
        Self {
            monochrome: false,
            brightness: BRIGHTNESS_RANGE.default,
            contrast: CONTRAST_RANGE.default,
            saturation: SATURATION_RANGE.default,
            gamma: GAMMA_RANGE.default,
        }
    }
}

/// Full parameter set handed to the processing engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdjustmentParams {
    pub filters: Filters,
    pub color: ColorAdjustments,
}

impl AdjustmentParams {
    /// True when every parameter sits exactly on its no-op default.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub fn get(&self, key: AdjustmentKey) -> AdjustmentValue {
        match key {
            AdjustmentKey::Blur => AdjustmentValue::Amount(self.filters.blur),
            AdjustmentKey::Sharpen => AdjustmentValue::Amount(self.filters.sharpen),
            AdjustmentKey::Pixelate => AdjustmentValue::Amount(self.filters.pixelate),
            AdjustmentKey::Monochrome => AdjustmentValue::Toggle(self.color.monochrome),
            AdjustmentKey::Brightness => AdjustmentValue::Amount(self.color.brightness),
            AdjustmentKey::Contrast => AdjustmentValue::Amount(self.color.contrast),
            AdjustmentKey::Saturation => AdjustmentValue::Amount(self.color.saturation),
            AdjustmentKey::Gamma => AdjustmentValue::Amount(self.color.gamma),
        }
    }

    pub(super) fn amount_slot(&mut self, key: AdjustmentKey) -> Option<&mut f64> {
        match key {
            AdjustmentKey::Blur => Some(&mut self.filters.blur),
            AdjustmentKey::Sharpen => Some(&mut self.filters.sharpen),
            AdjustmentKey::Pixelate => Some(&mut self.filters.pixelate),
            AdjustmentKey::Brightness => Some(&mut self.color.brightness),
            AdjustmentKey::Contrast => Some(&mut self.color.contrast),
            AdjustmentKey::Saturation => Some(&mut self.color.saturation),
            AdjustmentKey::Gamma => Some(&mut self.color.gamma),
            AdjustmentKey::Monochrome => None,
        }
    }

    /// Pixelate block size as the engine expects it.
    pub fn pixelate_block_size(&self) -> u32 {
        self.filters.pixelate.round().max(0.0) as u32
    }
}
