use super::{AssetItem, Category, Rgb};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static NULL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)null").expect("null pattern is valid"));
static ADJUSTMENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)adjustment").expect("adjustment pattern is valid"));

/// Classify a synthetic asset by its display name.
///
/// "null" is checked before "adjustment", so a name containing both
/// (e.g. `AdjustmentNullThing`) is a null.
pub fn classify(name: &str) -> Category {
    if NULL_NAME.is_match(name) {
        Category::Null
    } else if ADJUSTMENT_NAME.is_match(name) {
        Category::Adjustment
    } else {
        Category::Solid
    }
}

/// Quantize a [0, 1] channel to 8 bits, rounding half away from zero
pub fn quantize_channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Six uppercase hex digits, red first, no leading `#`
pub fn color_hex(color: Rgb) -> String {
    let [r, g, b] = color.0.map(quantize_channel);
    format!("{r:02X}{g:02X}{b:02X}")
}

/// Grouping key of a synthetic asset.
///
/// Renders as `{CATEGORY}_{HEX}_{W}x{H}_{PIXEL_ASPECT}`. None of the fields
/// can contain `_`: categories and hex digits are fixed alphabets and the
/// numbers render without exponents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Signature {
    pub category: Category,
    pub hex: String,
    pub width: u32,
    pub height: u32,
    pub pixel_aspect: String,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}x{}_{}",
            self.category, self.hex, self.width, self.height, self.pixel_aspect
        )
    }
}

pub fn build_signature(asset: &AssetItem) -> Signature {
    let source = &asset.source;
    Signature {
        category: classify(&asset.name),
        hex: color_hex(source.color),
        width: source.width,
        height: source.height,
        pixel_aspect: source.pixel_aspect.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidation::{ItemId, SyntheticSource};

    fn asset(name: &str, color: [f64; 3], width: u32, height: u32, pixel_aspect: f64) -> AssetItem {
        AssetItem {
            id: ItemId(1),
            name: name.to_string(),
            source: SyntheticSource {
                color: Rgb(color),
                width,
                height,
                pixel_aspect,
            },
            parent: ItemId(0),
        }
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(color_hex(Rgb([0.0, 0.0, 0.0])), "000000");
        assert_eq!(color_hex(Rgb([1.0, 1.0, 1.0])), "FFFFFF");
        assert_eq!(color_hex(Rgb([1.0, 0.0, 0.0])), "FF0000");
        assert_eq!(color_hex(Rgb([0.2, 0.4, 0.6])), "336699");
    }

    #[test]
    fn test_half_channel_rounds_up() {
        // 0.5 * 255 = 127.5 exactly
        assert_eq!(quantize_channel(0.5), 128);
        assert_eq!(color_hex(Rgb([0.5, 0.5, 0.5])), "808080");
    }

    #[test]
    fn test_out_of_range_channels_clamp() {
        assert_eq!(color_hex(Rgb([-0.2, 1.7, 0.0])), "00FF00");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("Null 1"), Category::Null);
        assert_eq!(classify("CAMERA NULL"), Category::Null);
        assert_eq!(classify("Adjustment Layer 3"), Category::Adjustment);
        assert_eq!(classify("Dark Gray Solid 1"), Category::Solid);
        assert_eq!(classify(""), Category::Solid);
    }

    #[test]
    fn test_classify_null_takes_precedence() {
        assert_eq!(classify("AdjustmentNullThing"), Category::Null);
    }

    #[test]
    fn test_signature_rendering() {
        let signature = build_signature(&asset("Red Solid 1", [1.0, 0.0, 0.0], 1920, 1080, 1.0));
        assert_eq!(signature.to_string(), "SOLID_FF0000_1920x1080_1");

        let anamorphic = build_signature(&asset("Null 2", [1.0, 1.0, 1.0], 1440, 1080, 1.333));
        assert_eq!(anamorphic.to_string(), "NULL_FFFFFF_1440x1080_1.333");
    }

    #[test]
    fn test_signature_ignores_name_beyond_category() {
        let a = build_signature(&asset("Red Solid 1", [1.0, 0.0, 0.0], 100, 100, 1.0));
        let b = build_signature(&asset("Background", [1.0, 0.0, 0.0], 100, 100, 1.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_distinguishes_every_field() {
        let base = build_signature(&asset("Solid", [1.0, 0.0, 0.0], 100, 100, 1.0));
        let variants = [
            asset("Null", [1.0, 0.0, 0.0], 100, 100, 1.0),
            asset("Solid", [0.0, 1.0, 0.0], 100, 100, 1.0),
            asset("Solid", [1.0, 0.0, 0.0], 200, 100, 1.0),
            asset("Solid", [1.0, 0.0, 0.0], 100, 200, 1.0),
            asset("Solid", [1.0, 0.0, 0.0], 100, 100, 2.0),
        ];
        for variant in &variants {
            assert_ne!(build_signature(variant), base);
        }
    }

    #[test]
    fn test_near_colors_share_a_signature() {
        let a = build_signature(&asset("Solid", [0.5, 0.5, 0.5], 100, 100, 1.0));
        let b = build_signature(&asset("Solid", [0.502, 0.5, 0.503], 100, 100, 1.0));
        assert_eq!(a, b);
    }
}
