// src/config.rs
// 可视化参数，全部可由宿主页面以 JSON 覆盖
use anyhow::{Context, bail, ensure};
use serde::{Deserialize, Serialize};

/// How a flowing particle's opacity follows its progress along an edge.
/// Both curves are zero at 0 and 1 so the wrap-around is seamless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpacityCurve {
    #[default]
    Sine,
    Triangle,
}

impl OpacityCurve {
    /// Opacity in `[0, 1]` for a progress value in `[0, 1]`.
    pub fn opacity(self, progress: f32) -> f32 {
        let t = progress.clamp(0.0, 1.0);
        match self {
            OpacityCurve::Sine => (t * std::f32::consts::PI).sin().max(0.0),
            OpacityCurve::Triangle => 1.0 - (2.0 * t - 1.0).abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub node_count: usize,
    pub particle_count: usize,

    /// Radians added to yaw every frame.
    pub yaw_speed: f32,
    pub base_pitch: f32,
    pub pitch_gain: f32,
    pub focal_length: f32,
    /// Depth below which nodes and connections are culled.
    pub visibility_floor: f32,
    pub opacity_curve: OpacityCurve,

    // --- scene generation ---
    pub ring_radius: [f32; 2],
    pub depth_amplitude: f32,
    pub node_size: [f32; 2],
    pub particle_speed: [f32; 2],

    // --- appearance ---
    pub particle_radius: f32,
    pub particle_opacity: f32,
    pub particle_glow_radius: f32,
    pub connection_alpha: f32,
    pub connection_width: f32,

    /// Fixed seed for reproducible topology; a fresh one is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            node_count: 12,
            particle_count: 20,
            yaw_speed: 0.008,
            base_pitch: 0.3,
            pitch_gain: 0.2,
            focal_length: 600.0,
            visibility_floor: -500.0,
            opacity_curve: OpacityCurve::Sine,
            ring_radius: [80.0, 140.0],
            depth_amplitude: 60.0,
            node_size: [4.0, 7.0],
            particle_speed: [0.005, 0.015],
            particle_radius: 3.0,
            particle_opacity: 0.8,
            particle_glow_radius: 8.0,
            connection_alpha: 0.15,
            connection_width: 1.0,
            seed: None,
        }
    }
}

impl VisualizationConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid visualization config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let scalars = [
            ("yaw_speed", self.yaw_speed),
            ("base_pitch", self.base_pitch),
            ("pitch_gain", self.pitch_gain),
            ("focal_length", self.focal_length),
            ("visibility_floor", self.visibility_floor),
            ("depth_amplitude", self.depth_amplitude),
            ("particle_radius", self.particle_radius),
            ("particle_opacity", self.particle_opacity),
            ("particle_glow_radius", self.particle_glow_radius),
            ("connection_alpha", self.connection_alpha),
            ("connection_width", self.connection_width),
        ];
        for (name, value) in scalars {
            ensure!(value.is_finite(), "{name} must be finite, got {value}");
        }

        check_range("ring_radius", self.ring_radius)?;
        check_range("node_size", self.node_size)?;
        check_range("particle_speed", self.particle_speed)?;
        ensure!(self.particle_speed[0] > 0.0, "particle_speed must be positive");
        ensure!(self.visibility_floor < 0.0, "visibility_floor must be negative");
        ensure!(
            (0.0..=1.0).contains(&self.particle_opacity) && (0.0..=1.0).contains(&self.connection_alpha),
            "opacities must lie in [0, 1]"
        );
        Ok(())
    }
}

/// Floating-particle background layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    pub star_count: usize,
    /// Depth at which stars spawn; they travel towards zero.
    pub far_plane: f32,
    pub star_size: [f32; 2],
    pub star_speed: [f32; 2],
    pub parallax: f32,
    pub max_opacity: f32,
    pub seed: Option<u64>,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            star_count: 50,
            far_plane: 1000.0,
            star_size: [1.0, 3.0],
            star_speed: [0.2, 0.7],
            parallax: 0.0001,
            max_opacity: 0.5,
            seed: None,
        }
    }
}

impl StarfieldConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid starfield config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.far_plane.is_finite() && self.far_plane > 0.0,
            "far_plane must be positive, got {}",
            self.far_plane
        );
        check_range("star_size", self.star_size)?;
        check_range("star_speed", self.star_speed)?;
        ensure!(self.star_speed[0] > 0.0, "star_speed must be positive");
        ensure!(self.parallax.is_finite(), "parallax must be finite");
        ensure!((0.0..=1.0).contains(&self.max_opacity), "max_opacity must lie in [0, 1]");
        Ok(())
    }
}

fn check_range(name: &str, [lo, hi]: [f32; 2]) -> anyhow::Result<()> {
    if !lo.is_finite() || !hi.is_finite() {
        bail!("{name} bounds must be finite");
    }
    ensure!(lo <= hi, "{name} lower bound {lo} exceeds upper bound {hi}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tunables() {
        let config = VisualizationConfig::default();
        assert_eq!(config.node_count, 12);
        assert_eq!(config.particle_count, 20);
        assert_eq!(config.focal_length, 600.0);
        assert_eq!(config.visibility_floor, -500.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = VisualizationConfig::from_json(r#"{"node_count": 5, "seed": 42}"#).unwrap();
        assert_eq!(config.node_count, 5);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.particle_count, 20);
        assert_eq!(config.opacity_curve, OpacityCurve::Sine);
    }

    #[test]
    fn opacity_curve_parses_snake_case() {
        let config = VisualizationConfig::from_json(r#"{"opacity_curve": "triangle"}"#).unwrap();
        assert_eq!(config.opacity_curve, OpacityCurve::Triangle);
    }

    #[test]
    fn rejects_inverted_ranges() {
        let err = VisualizationConfig::from_json(r#"{"node_size": [7.0, 4.0]}"#).unwrap_err();
        assert!(err.to_string().contains("node_size"));
    }

    #[test]
    fn rejects_non_negative_floor() {
        assert!(VisualizationConfig::from_json(r#"{"visibility_floor": 10.0}"#).is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(VisualizationConfig::from_json("{node_count:").is_err());
    }

    #[test]
    fn opacity_boundaries() {
        for curve in [OpacityCurve::Sine, OpacityCurve::Triangle] {
            assert!(curve.opacity(0.0).abs() < 1e-6);
            assert!(curve.opacity(1.0).abs() < 1e-6);
            assert!((curve.opacity(0.5) - 1.0).abs() < 1e-6);
            assert!(curve.opacity(0.25) < curve.opacity(0.5));
        }
    }

    #[test]
    fn starfield_defaults_are_valid() {
        assert!(StarfieldConfig::default().validate().is_ok());
        assert!(StarfieldConfig::from_json(r#"{"far_plane": -1.0}"#).is_err());
    }
}
