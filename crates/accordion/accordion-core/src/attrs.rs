//! Typed attribute reads with fallback defaults.
//!
//! Attribute presence is meaningful on Items: an absent attribute inherits the
//! Container default, a present one overrides it. Malformed values never
//! surface as errors; they resolve to the supplied fallback.

use crate::host::Dom;

pub const AUTO_CLOSE: &str = "data-auto-close";
pub const ALLOW_MULTIPLE: &str = "data-allow-multiple";
pub const DURATION: &str = "data-duration";
pub const EASING: &str = "data-easing";
pub const CONTENT_FADE: &str = "data-content-fade";
pub const FADE_DURATION: &str = "data-fade-duration";
pub const SLIDE_DISTANCE: &str = "data-slide-distance";
pub const STAGGER: &str = "data-stagger";
pub const ITEM_ID: &str = "data-item-id";
pub const OPEN_DEFAULT: &str = "data-open-default";
pub const LINK_GROUP: &str = "data-link-group";
pub const CUSTOM_CLASS: &str = "data-custom-class";

/// Parse a finite float. Surrounding whitespace is ignored.
pub fn parse_f32(raw: &str) -> Option<f32> {
    raw.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative integer; fractional input is truncated.
pub fn parse_u32(raw: &str) -> Option<u32> {
    let value = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    if value < 0.0 {
        return Some(0);
    }
    Some(value.trunc().min(u32::MAX as f64) as u32)
}

/// Boolean attributes are true unless they spell out a negative.
/// A bare attribute (`data-auto-close=""`) reads as true.
pub fn parse_bool(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

pub fn read_f32<D: Dom + ?Sized>(dom: &D, node: &D::Node, name: &str, fallback: f32) -> f32 {
    dom.attribute(node, name)
        .as_deref()
        .and_then(parse_f32)
        .unwrap_or(fallback)
}

pub fn read_u32<D: Dom + ?Sized>(dom: &D, node: &D::Node, name: &str, fallback: u32) -> u32 {
    dom.attribute(node, name)
        .as_deref()
        .and_then(parse_u32)
        .unwrap_or(fallback)
}

pub fn read_bool<D: Dom + ?Sized>(dom: &D, node: &D::Node, name: &str, fallback: bool) -> bool {
    dom.attribute(node, name)
        .as_deref()
        .map(parse_bool)
        .unwrap_or(fallback)
}

pub fn read_string<D: Dom + ?Sized>(
    dom: &D,
    node: &D::Node,
    name: &str,
    fallback: &str,
) -> String {
    dom.attribute(node, name)
        .unwrap_or_else(|| fallback.to_string())
}

/// Non-empty string attribute, or `None` when absent or blank.
pub fn read_non_empty<D: Dom + ?Sized>(dom: &D, node: &D::Node, name: &str) -> Option<String> {
    dom.attribute(node, name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_reject_garbage() {
        assert_eq!(parse_f32("0.25"), Some(0.25));
        assert_eq!(parse_f32(" 1 "), Some(1.0));
        assert_eq!(parse_f32("abc"), None);
        assert_eq!(parse_f32(""), None);
        assert_eq!(parse_f32("NaN"), None);
        assert_eq!(parse_f32("inf"), None);
    }

    #[test]
    fn integers_truncate_and_floor_at_zero() {
        assert_eq!(parse_u32("12"), Some(12));
        assert_eq!(parse_u32("12.9"), Some(12));
        assert_eq!(parse_u32("-4"), Some(0));
        assert_eq!(parse_u32("ten"), None);
    }

    #[test]
    fn booleans_default_to_true_when_present() {
        assert!(parse_bool(""));
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("FALSE"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool(" off "));
    }
}
