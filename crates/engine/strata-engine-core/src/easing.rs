//! Easing curves: pure functions mapping progress in [0,1] to eased
//! progress in [0,1]. Every curve satisfies eval(0) == 0 and eval(1) == 1.

use serde::{Deserialize, Serialize};

/// Curve identifiers. Unknown ids (from JSON or host strings) fall back to
/// `Linear`; easing has no failure mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Curve {
    EaseIn,
    EaseOut,
    EaseInOut,
    Parabolic,
    Cubic,
    // serde requires the catch-all variant to come last.
    #[default]
    #[serde(other)]
    Linear,
}

impl Curve {
    /// Parse a curve id, falling back to linear for unknown names.
    pub fn from_id(id: &str) -> Self {
        match id {
            "linear" => Curve::Linear,
            "easeIn" => Curve::EaseIn,
            "easeOut" => Curve::EaseOut,
            "easeInOut" => Curve::EaseInOut,
            "parabolic" => Curve::Parabolic,
            "cubic" => Curve::Cubic,
            other => {
                log::warn!("unknown easing curve '{other}', falling back to linear");
                Curve::Linear
            }
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Curve::Linear => "linear",
            Curve::EaseIn => "easeIn",
            Curve::EaseOut => "easeOut",
            Curve::EaseInOut => "easeInOut",
            Curve::Parabolic => "parabolic",
            Curve::Cubic => "cubic",
        }
    }

    /// Evaluate the curve at progress t (clamped to [0,1]).
    #[inline]
    pub fn eval(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::EaseIn => t * t,
            Curve::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Curve::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u / 2.0
                }
            }
            Curve::Parabolic => t * (2.0 - t),
            Curve::Cubic => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
