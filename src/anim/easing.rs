use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Named easing curves. Every curve maps 0 to 0 and 1 to 1 and is monotonic
/// on `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    pub const ALL: [Easing; 6] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
    ];

    /// Remaps linear progress. Input is clamped to `[0, 1]`, NaN maps to 0.
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => ease_in_out(t),
            Easing::EaseOutCubic => ease_out_cubic(t),
            Easing::EaseInOutCubic => ease_in_out_cubic(t),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
            Easing::EaseOutCubic => "ease-out-cubic",
            Easing::EaseInOutCubic => "ease-in-out-cubic",
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown easing curve: {0:?}")]
pub struct ParseEasingError(pub String);

impl FromStr for Easing {
    type Err = ParseEasingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Easing::ALL
            .into_iter()
            .find(|easing| easing.name() == normalized)
            .ok_or_else(|| ParseEasingError(s.to_string()))
    }
}

impl TryFrom<String> for Easing {
    type Error = ParseEasingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::linear(Easing::Linear)]
    #[case::ease_in(Easing::EaseIn)]
    #[case::ease_out(Easing::EaseOut)]
    #[case::ease_in_out(Easing::EaseInOut)]
    #[case::ease_out_cubic(Easing::EaseOutCubic)]
    #[case::ease_in_out_cubic(Easing::EaseInOutCubic)]
    fn endpoints_and_monotonic(#[case] easing: Easing) {
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(1.0), 1.0);
        let mut last = 0.0;
        for i in 0..=100 {
            let v = easing.apply(i as f32 / 100.0);
            assert!(v >= last, "{easing} decreased at step {i}");
            last = v;
        }
    }

    #[test]
    fn clamps_out_of_range_input() {
        assert_eq!(Easing::EaseOutCubic.apply(-3.0), 0.0);
        assert_eq!(Easing::EaseOutCubic.apply(7.0), 1.0);
        assert_eq!(Easing::Linear.apply(f32::NAN), 0.0);
    }

    #[test]
    fn ease_out_cubic_matches_formula() {
        let v = Easing::EaseOutCubic.apply(0.5);
        assert!((v - 0.875).abs() < 1e-6);
    }

    #[rstest]
    #[case("linear", Easing::Linear)]
    #[case("ease-out-cubic", Easing::EaseOutCubic)]
    #[case("EASE_IN_OUT", Easing::EaseInOut)]
    #[case("  ease-in ", Easing::EaseIn)]
    fn parses_names(#[case] input: &str, #[case] expected: Easing) {
        assert_eq!(input.parse::<Easing>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!("bounce".parse::<Easing>(), Err(ParseEasingError("bounce".into())));
    }

    #[test]
    fn display_matches_parse() {
        for easing in Easing::ALL {
            assert_eq!(easing.to_string().parse::<Easing>(), Ok(easing));
        }
    }
}
