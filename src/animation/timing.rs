/// Easing curve mapping normalized progress to eased progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeFunction {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl TimeFunction {
    /// Quadratic in/out halves; `EaseInOut` glues them at the midpoint.
    pub fn sample(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut if t < 0.5 => 2.0 * t * t,
            Self::EaseInOut => {
                let remaining = 1.0 - t;
                1.0 - 2.0 * remaining * remaining
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curves_fix_both_endpoints() {
        for f in [
            TimeFunction::Linear,
            TimeFunction::EaseIn,
            TimeFunction::EaseOut,
            TimeFunction::EaseInOut,
        ] {
            assert_eq!(f.sample(0.0), 0.0);
            assert_eq!(f.sample(1.0), 1.0);
        }
    }

    #[test]
    fn curve_shapes_at_the_midpoint() {
        assert_eq!(TimeFunction::Linear.sample(0.5), 0.5);
        assert_eq!(TimeFunction::EaseIn.sample(0.5), 0.25);
        assert_eq!(TimeFunction::EaseOut.sample(0.5), 0.75);
        assert_eq!(TimeFunction::EaseInOut.sample(0.5), 0.5);
    }

    #[test]
    fn ease_in_out_halves_join_smoothly() {
        let below = TimeFunction::EaseInOut.sample(0.5 - 1e-9);
        let above = TimeFunction::EaseInOut.sample(0.5 + 1e-9);
        assert!((above - below).abs() < 1e-8);
    }

    #[test]
    fn sampling_clamps_out_of_range_input() {
        assert_eq!(TimeFunction::EaseIn.sample(-2.0), 0.0);
        assert_eq!(TimeFunction::EaseIn.sample(3.0), 1.0);
    }
}
