// Thermal overlay colour mapping
//
// Below the first breakpoint everything is blue, above the last it is red,
// and each segment eases between its two anchors with a cubic smoothstep.
use serde::Serialize;

/// RGB triple with every channel in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0);
    pub const CYAN: Color = Color::new(0.0, 1.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Largest per-channel difference, used for tolerance comparisons
    pub fn distance(&self, other: &Color) -> f64 {
        (self.r - other.r)
            .abs()
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
    }
}

/// Linear blend between two values of the same kind
pub trait Lerp: Copy {
    fn lerp(self, target: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, target: Self, t: f64) -> Self {
        self + (target - self) * t
    }
}

impl Lerp for Color {
    fn lerp(self, target: Self, t: f64) -> Self {
        Color::new(
            self.r.lerp(target.r, t),
            self.g.lerp(target.g, t),
            self.b.lerp(target.b, t),
        )
    }
}

/// Hermite easing `3x² - 2x³` of `x` normalised over [edge0, edge1], clamped to [0, 1]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub const DEFAULT_BREAKPOINTS: [f64; 4] = [20.0, 100.0, 170.0, 220.0];

/// Piecewise colour scale: cold, nominal-low, optimal and critical anchors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    breakpoints: [f64; 4],
    anchors: [Color; 4],
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::new(DEFAULT_BREAKPOINTS)
    }
}

impl ColorScale {
    /// Breakpoints must be strictly increasing; configuration validates this before
    /// a scale is built from user input.
    pub fn new(breakpoints: [f64; 4]) -> Self {
        Self {
            breakpoints,
            anchors: [Color::BLUE, Color::CYAN, Color::GREEN, Color::RED],
        }
    }

    pub fn color_for(&self, temp_c: f64) -> Color {
        let [cold, low, optimal, critical] = self.breakpoints;
        let [blue, cyan, green, red] = self.anchors;

        // NaN would fall through every comparison; treat an unreadable sensor as cold
        if temp_c.is_nan() {
            return blue;
        }

        if temp_c < low {
            blue.lerp(cyan, smoothstep(cold, low, temp_c))
        } else if temp_c <= optimal {
            cyan.lerp(green, smoothstep(low, optimal, temp_c))
        } else {
            green.lerp(red, smoothstep(optimal, critical, temp_c))
        }
    }
}

/// Map a temperature in °C onto the default thermal scale
pub fn map_temperature_to_color(temp_c: f64) -> Color {
    ColorScale::default().color_for(temp_c)
}

/// Move `current` a fixed fraction of the way toward `target`
pub fn approach<T: Lerp>(current: T, target: T, factor: f64) -> T {
    current.lerp(target, factor)
}

pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.1;

/// Animates a displayed temperature toward the live reading, one step per frame
#[derive(Debug, Clone, Copy)]
pub struct ThermalSmoother {
    current: f64,
    factor: f64,
}

impl ThermalSmoother {
    pub fn new(initial: f64, factor: f64) -> Self {
        Self {
            current: initial,
            factor,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn step(&mut self, target: f64) -> f64 {
        // A NaN target would poison every later frame
        if target.is_finite() {
            self.current = approach(self.current, target, self.factor);
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_saturates_outside_range() {
        for t in [-273.15, -40.0, 0.0, 19.9, 20.0] {
            assert!(map_temperature_to_color(t).distance(&Color::BLUE) < TOLERANCE, "t={t}");
        }
        for t in [220.0, 221.0, 400.0, 1e6] {
            assert!(map_temperature_to_color(t).distance(&Color::RED) < TOLERANCE, "t={t}");
        }
        assert_eq!(map_temperature_to_color(f64::NEG_INFINITY), Color::BLUE);
        assert_eq!(map_temperature_to_color(f64::INFINITY), Color::RED);
    }

    #[test]
    fn test_anchor_points() {
        assert!(map_temperature_to_color(100.0).distance(&Color::CYAN) < TOLERANCE);
        assert!(map_temperature_to_color(170.0).distance(&Color::GREEN) < TOLERANCE);
    }

    #[test]
    fn test_segment_midpoints_use_smoothstep() {
        // Halfway through a segment smoothstep and linear agree
        let mid = map_temperature_to_color(60.0);
        assert!(mid.distance(&Color::new(0.0, 0.5, 1.0)) < TOLERANCE);

        // A quarter of the way in, smoothstep gives 0.15625 instead of 0.25
        let quarter = map_temperature_to_color(40.0);
        assert!((quarter.g - 0.15625).abs() < TOLERANCE);

        let hot = map_temperature_to_color(195.0);
        assert!(hot.distance(&Color::new(0.5, 0.5, 0.0)) < TOLERANCE);
    }

    #[test]
    fn test_continuous_across_breakpoints() {
        for breakpoint in [100.0, 170.0] {
            let below = map_temperature_to_color(breakpoint - 1e-6);
            let above = map_temperature_to_color(breakpoint + 1e-6);
            assert!(below.distance(&above) < 1e-6, "jump at {breakpoint}");
        }

        let mut previous = map_temperature_to_color(0.0);
        let mut t = 0.0;
        while t <= 240.0 {
            let color = map_temperature_to_color(t);
            assert!(color.distance(&previous) < 0.02, "jump near {t}");
            previous = color;
            t += 0.25;
        }
    }

    #[test]
    fn test_channels_stay_in_unit_range() {
        let mut t = -50.0;
        while t <= 300.0 {
            let c = map_temperature_to_color(t);
            for channel in [c.r, c.g, c.b] {
                assert!((0.0..=1.0).contains(&channel), "t={t} channel={channel}");
            }
            t += 1.5;
        }
    }

    #[test]
    fn test_nan_maps_to_cold() {
        assert_eq!(map_temperature_to_color(f64::NAN), Color::BLUE);
    }

    #[test]
    fn test_custom_breakpoints() {
        let scale = ColorScale::new([0.0, 50.0, 80.0, 120.0]);
        assert!(scale.color_for(80.0).distance(&Color::GREEN) < TOLERANCE);
        assert!(scale.color_for(120.0).distance(&Color::RED) < TOLERANCE);
    }

    #[test]
    fn test_approach_moves_fixed_fraction() {
        assert!((approach(20.0, 120.0, 0.1) - 30.0).abs() < TOLERANCE);

        let halfway = approach(Color::BLUE, Color::RED, 0.5);
        assert!(halfway.distance(&Color::new(0.5, 0.0, 0.5)) < TOLERANCE);
    }

    #[test]
    fn test_smoother_converges_without_overshoot() {
        let mut smoother = ThermalSmoother::new(20.0, DEFAULT_SMOOTHING_FACTOR);
        assert!((smoother.step(220.0) - 40.0).abs() < TOLERANCE);

        let mut last = smoother.current();
        for _ in 0..200 {
            let next = smoother.step(220.0);
            assert!(next > last && next <= 220.0);
            last = next;
        }
        assert!((220.0 - last).abs() < 1e-6);
    }

    #[test]
    fn test_smoother_ignores_non_finite_targets() {
        let mut smoother = ThermalSmoother::new(80.0, DEFAULT_SMOOTHING_FACTOR);
        assert_eq!(smoother.step(f64::NAN), 80.0);
        assert_eq!(smoother.step(f64::INFINITY), 80.0);
    }
}
