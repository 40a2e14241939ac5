use serde::{Deserialize, Serialize};

/// How a slider spreads its range across the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    #[default]
    Linear,
    /// Equal track distance per decade. Requires a positive minimum.
    Logarithmic,
}

impl ScaleKind {
    /// Maps a track proportion in `[0, 1]` to a value in `[min, max]`.
    pub fn to_value(self, proportion: f64, min: f64, max: f64) -> f64 {
        match self {
            ScaleKind::Linear => min + proportion * (max - min),
            ScaleKind::Logarithmic => {
                let (log_min, log_max) = (min.log10(), max.log10());
                10f64.powf(log_min + proportion * (log_max - log_min))
            }
        }
    }

    /// Inverse of [`ScaleKind::to_value`].
    pub fn to_proportion(self, value: f64, min: f64, max: f64) -> f64 {
        match self {
            ScaleKind::Linear => (value - min) / (max - min),
            ScaleKind::Logarithmic => {
                let (log_min, log_max) = (min.log10(), max.log10());
                (value.log10() - log_min) / (log_max - log_min)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_center_sits_at_midpoint() {
        let p = ScaleKind::Logarithmic.to_proportion(100.0, 10.0, 1000.0);
        assert!((p - 0.5).abs() < 1e-12);
        let v = ScaleKind::Logarithmic.to_value(0.5, 10.0, 1000.0);
        assert!((v - 100.0).abs() < 1e-9);
    }

    #[test]
    fn ends_map_to_bounds() {
        for kind in [ScaleKind::Linear, ScaleKind::Logarithmic] {
            assert!((kind.to_value(0.0, 10.0, 1000.0) - 10.0).abs() < 1e-9);
            assert!((kind.to_value(1.0, 10.0, 1000.0) - 1000.0).abs() < 1e-9);
        }
    }

    #[test]
    fn proportion_round_trips() {
        for kind in [ScaleKind::Linear, ScaleKind::Logarithmic] {
            for i in 0..=20 {
                let p = i as f64 / 20.0;
                let back = kind.to_proportion(kind.to_value(p, 10.0, 1000.0), 10.0, 1000.0);
                assert!((back - p).abs() < 1e-9, "{kind:?} at {p}");
            }
        }
        let back = ScaleKind::Linear.to_proportion(ScaleKind::Linear.to_value(0.37, 0.0, 100.0), 0.0, 100.0);
        assert!((back - 0.37).abs() < 1e-12);
    }

    #[test]
    fn deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            scale: ScaleKind,
        }
        let w: Wrapper = serde_json::from_str(r#"{"scale":"logarithmic"}"#).unwrap();
        assert_eq!(w.scale, ScaleKind::Logarithmic);
    }
}
