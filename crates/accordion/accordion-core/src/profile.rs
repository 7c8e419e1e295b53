//! Animation profiles and their resolution.
//!
//! Resolution order for every field: Item override (attribute present) >
//! Container default > hard-coded fallback. Reduced motion then forces all
//! timings to zero.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attrs;
use crate::error::ParseEasingError;
use crate::host::Dom;

pub const MAX_DURATION: f32 = 1.0;
pub const MAX_FADE_DURATION: f32 = 0.8;
pub const MAX_SLIDE_DISTANCE: u32 = 50;
pub const MAX_STAGGER: u32 = 200;

/// CSS timing function accepted for height and fade transitions.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Easing {
    #[default]
    Ease,
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    StepStart,
    StepEnd,
    CubicBezier([f32; 4]),
}

impl FromStr for Easing {
    type Err = ParseEasingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim().to_ascii_lowercase();
        let easing = match s.as_str() {
            "ease" => Easing::Ease,
            "linear" => Easing::Linear,
            "ease-in" => Easing::EaseIn,
            "ease-out" => Easing::EaseOut,
            "ease-in-out" => Easing::EaseInOut,
            "step-start" => Easing::StepStart,
            "step-end" => Easing::StepEnd,
            _ => {
                let args = s
                    .strip_prefix("cubic-bezier(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .ok_or_else(|| ParseEasingError(raw.to_string()))?;
                let mut points = [0.0f32; 4];
                let mut count = 0;
                for part in args.split(',') {
                    let value = attrs::parse_f32(part)
                        .ok_or_else(|| ParseEasingError(raw.to_string()))?;
                    if count == 4 {
                        return Err(ParseEasingError(raw.to_string()));
                    }
                    points[count] = value;
                    count += 1;
                }
                // x coordinates must stay inside [0, 1] for a valid timing curve.
                let x_ok = (0.0..=1.0).contains(&points[0]) && (0.0..=1.0).contains(&points[2]);
                if count != 4 || !x_ok {
                    return Err(ParseEasingError(raw.to_string()));
                }
                Easing::CubicBezier(points)
            }
        };
        Ok(easing)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Ease => f.write_str("ease"),
            Easing::Linear => f.write_str("linear"),
            Easing::EaseIn => f.write_str("ease-in"),
            Easing::EaseOut => f.write_str("ease-out"),
            Easing::EaseInOut => f.write_str("ease-in-out"),
            Easing::StepStart => f.write_str("step-start"),
            Easing::StepEnd => f.write_str("step-end"),
            Easing::CubicBezier([x1, y1, x2, y2]) => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }
}

impl From<String> for Easing {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}

/// Resolved settings governing one open/close animation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationProfile {
    /// Height transition length in seconds, within `[0, 1]`.
    pub duration: f32,
    pub easing: Easing,
    pub content_fade: bool,
    /// Child fade/slide length in seconds, within `[0, 0.8]`.
    pub fade_duration: f32,
    /// Child slide offset in pixels, within `[0, 50]`.
    pub slide_distance: u32,
    /// Per-child fade delay in milliseconds, within `[0, 200]`.
    pub stagger: u32,
}

impl Default for AnimationProfile {
    fn default() -> Self {
        Self {
            duration: 0.4,
            easing: Easing::Ease,
            content_fade: true,
            fade_duration: 0.3,
            slide_distance: 10,
            stagger: 0,
        }
    }
}

impl AnimationProfile {
    /// Read a Container's default profile, falling back field by field.
    pub fn read<D: Dom + ?Sized>(dom: &D, node: &D::Node, fallback: &AnimationProfile) -> Self {
        let easing = dom
            .attribute(node, attrs::EASING)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(fallback.easing);
        AnimationProfile {
            duration: attrs::read_f32(dom, node, attrs::DURATION, fallback.duration),
            easing,
            content_fade: attrs::read_bool(dom, node, attrs::CONTENT_FADE, fallback.content_fade),
            fade_duration: attrs::read_f32(
                dom,
                node,
                attrs::FADE_DURATION,
                fallback.fade_duration,
            ),
            slide_distance: attrs::read_u32(
                dom,
                node,
                attrs::SLIDE_DISTANCE,
                fallback.slide_distance,
            ),
            stagger: attrs::read_u32(dom, node, attrs::STAGGER, fallback.stagger),
        }
        .clamped()
    }

    /// Force every field into its declared range.
    pub fn clamped(mut self) -> Self {
        self.duration = self.duration.clamp(0.0, MAX_DURATION);
        self.fade_duration = self.fade_duration.clamp(0.0, MAX_FADE_DURATION);
        self.slide_distance = self.slide_distance.min(MAX_SLIDE_DISTANCE);
        self.stagger = self.stagger.min(MAX_STAGGER);
        self
    }

    /// Zero every timing while keeping the visual parameters.
    pub fn reduced(mut self) -> Self {
        self.duration = 0.0;
        self.fade_duration = 0.0;
        self.stagger = 0;
        self
    }

    /// Instant profiles complete synchronously without frames or timers.
    #[inline]
    pub fn is_instant(&self) -> bool {
        self.duration <= 0.0
    }

    /// Whether children get the fade/slide treatment.
    #[inline]
    pub fn fades(&self) -> bool {
        self.content_fade && !self.is_instant()
    }

    #[inline]
    pub fn duration_ms(&self) -> u32 {
        (self.duration * 1000.0).round() as u32
    }

    pub fn height_transition(&self) -> String {
        format!("height {}s {}", self.duration, self.easing)
    }

    /// Transition list for the `index`-th animated child.
    pub fn child_transition(&self, index: usize, staggered: bool) -> String {
        let delay = if staggered {
            self.stagger as usize * index
        } else {
            0
        };
        format!(
            "opacity {fd}s {e} {delay}ms, transform {fd}s {e} {delay}ms",
            fd = self.fade_duration,
            e = self.easing,
        )
    }
}

/// Item-level overrides. `Some` means the attribute was present and well-formed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileOverrides {
    pub duration: Option<f32>,
    pub easing: Option<Easing>,
    pub content_fade: Option<bool>,
    pub fade_duration: Option<f32>,
    pub slide_distance: Option<u32>,
    pub stagger: Option<u32>,
}

impl ProfileOverrides {
    /// Presence check per field; explicit `false`/`0` values are honored.
    pub fn read<D: Dom + ?Sized>(dom: &D, node: &D::Node) -> Self {
        let raw = |name: &str| dom.attribute(node, name);
        ProfileOverrides {
            duration: raw(attrs::DURATION).as_deref().and_then(attrs::parse_f32),
            easing: raw(attrs::EASING).and_then(|v| v.parse().ok()),
            content_fade: raw(attrs::CONTENT_FADE).as_deref().map(attrs::parse_bool),
            fade_duration: raw(attrs::FADE_DURATION)
                .as_deref()
                .and_then(attrs::parse_f32),
            slide_distance: raw(attrs::SLIDE_DISTANCE)
                .as_deref()
                .and_then(attrs::parse_u32),
            stagger: raw(attrs::STAGGER).as_deref().and_then(attrs::parse_u32),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ProfileOverrides::default()
    }
}

/// Effective profile for one Item.
pub fn resolve(
    defaults: &AnimationProfile,
    overrides: &ProfileOverrides,
    reduced_motion: bool,
) -> AnimationProfile {
    let profile = AnimationProfile {
        duration: overrides.duration.unwrap_or(defaults.duration),
        easing: overrides.easing.unwrap_or(defaults.easing),
        content_fade: overrides.content_fade.unwrap_or(defaults.content_fade),
        fade_duration: overrides.fade_duration.unwrap_or(defaults.fade_duration),
        slide_distance: overrides.slide_distance.unwrap_or(defaults.slide_distance),
        stagger: overrides.stagger.unwrap_or(defaults.stagger),
    }
    .clamped();
    if reduced_motion {
        profile.reduced()
    } else {
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_keywords_round_trip_through_css() {
        for kw in ["ease", "linear", "ease-in", "ease-out", "ease-in-out"] {
            let parsed: Easing = kw.parse().unwrap();
            assert_eq!(parsed.to_string(), kw);
        }
    }

    #[test]
    fn cubic_bezier_is_parsed_and_validated() {
        let e: Easing = "cubic-bezier(0.4, 0, 0.2, 1)".parse().unwrap();
        assert_eq!(e, Easing::CubicBezier([0.4, 0.0, 0.2, 1.0]));
        assert_eq!(e.to_string(), "cubic-bezier(0.4, 0, 0.2, 1)");
        // y may overshoot, x may not
        assert!("cubic-bezier(0.3, -0.5, 0.7, 1.6)".parse::<Easing>().is_ok());
        assert!("cubic-bezier(1.5, 0, 0.2, 1)".parse::<Easing>().is_err());
        assert!("cubic-bezier(0.4, 0, 0.2)".parse::<Easing>().is_err());
        assert!("cubic-bezier(0.4, 0, 0.2, 1, 3)".parse::<Easing>().is_err());
        assert!("bouncy".parse::<Easing>().is_err());
    }

    #[test]
    fn easing_error_names_the_rejected_value() {
        let err = "bouncy".parse::<Easing>().unwrap_err();
        assert_eq!(err, ParseEasingError("bouncy".to_string()));
        assert_eq!(err.to_string(), "unsupported easing `bouncy`");
    }

    #[test]
    fn malformed_easing_deserializes_to_default() {
        assert_eq!(Easing::from("wobble".to_string()), Easing::Ease);
    }

    #[test]
    fn overrides_win_field_by_field() {
        let defaults = AnimationProfile::default();
        let overrides = ProfileOverrides {
            duration: Some(0.0),
            content_fade: Some(false),
            ..Default::default()
        };
        let p = resolve(&defaults, &overrides, false);
        assert_eq!(p.duration, 0.0);
        assert!(!p.content_fade);
        assert_eq!(p.fade_duration, defaults.fade_duration);
        assert_eq!(p.slide_distance, defaults.slide_distance);
    }

    #[test]
    fn reduced_motion_zeroes_timings_only() {
        let defaults = AnimationProfile {
            stagger: 80,
            ..Default::default()
        };
        let p = resolve(&defaults, &ProfileOverrides::default(), true);
        assert_eq!(p.duration, 0.0);
        assert_eq!(p.fade_duration, 0.0);
        assert_eq!(p.stagger, 0);
        assert_eq!(p.slide_distance, 10);
        assert!(p.content_fade);
        assert!(p.is_instant());
        assert!(!p.fades());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let overrides = ProfileOverrides {
            duration: Some(3.0),
            fade_duration: Some(-1.0),
            slide_distance: Some(400),
            stagger: Some(999),
            ..Default::default()
        };
        let p = resolve(&AnimationProfile::default(), &overrides, false);
        assert_eq!(p.duration, MAX_DURATION);
        assert_eq!(p.fade_duration, 0.0);
        assert_eq!(p.slide_distance, MAX_SLIDE_DISTANCE);
        assert_eq!(p.stagger, MAX_STAGGER);
    }

    #[test]
    fn child_transition_carries_stagger_delay() {
        let p = AnimationProfile {
            stagger: 50,
            ..Default::default()
        };
        assert_eq!(
            p.child_transition(2, true),
            "opacity 0.3s ease 100ms, transform 0.3s ease 100ms"
        );
        assert_eq!(
            p.child_transition(2, false),
            "opacity 0.3s ease 0ms, transform 0.3s ease 0ms"
        );
        assert_eq!(p.height_transition(), "height 0.4s ease");
    }
}
