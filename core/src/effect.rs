use std::fmt::Write;

use serde::Deserialize;

use crate::config::ConfigError;
use crate::geometry::{Point, Rect};

pub const DEFAULT_MAX_ROTATION: f32 = 15.0;
pub const DEFAULT_PERSPECTIVE: f32 = 1000.0;
pub const DEFAULT_GLARE_MULTIPLIER: f32 = 1.5;
pub const DEFAULT_TRANSITION_IN: &str = "transform 0.1s ease-out";
pub const DEFAULT_TRANSITION_OUT: &str = "transform 0.6s cubic-bezier(0.23, 1, 0.32, 1)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Holographic,
    Shimmer,
    Glare,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Holographic, Channel::Shimmer, Channel::Glare];

    pub fn class_name(self) -> &'static str {
        match self {
            Channel::Holographic => "holo-layer holo-color",
            Channel::Shimmer => "holo-layer holo-shimmer",
            Channel::Glare => "holo-layer holo-glare",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpacitySet {
    pub holographic: f32,
    pub shimmer: f32,
    pub glare: f32,
}

impl OpacitySet {
    pub const IDLE: OpacitySet = OpacitySet {
        holographic: 0.3,
        shimmer: 0.4,
        glare: 0.5,
    };
    pub const HOVER: OpacitySet = OpacitySet {
        holographic: 0.6,
        shimmer: 0.7,
        glare: 1.0,
    };

    pub fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Holographic => self.holographic,
            Channel::Shimmer => self.shimmer,
            Channel::Glare => self.glare,
        }
    }

    fn apply(&mut self, patch: &OpacityPatch) {
        if let Some(value) = patch.holographic {
            self.holographic = value.clamp(0.0, 1.0);
        }
        if let Some(value) = patch.shimmer {
            self.shimmer = value.clamp(0.0, 1.0);
        }
        if let Some(value) = patch.glare {
            self.glare = value.clamp(0.0, 1.0);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectConfig {
    pub max_rotation: f32,
    pub perspective: f32,
    pub glare_multiplier: f32,
    pub tilt: bool,
    pub holographic: bool,
    pub shimmer: bool,
    pub glare: bool,
    pub idle: OpacitySet,
    pub hover: OpacitySet,
    pub transition_in: String,
    pub transition_out: String,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            max_rotation: DEFAULT_MAX_ROTATION,
            perspective: DEFAULT_PERSPECTIVE,
            glare_multiplier: DEFAULT_GLARE_MULTIPLIER,
            tilt: true,
            holographic: true,
            shimmer: true,
            glare: true,
            idle: OpacitySet::IDLE,
            hover: OpacitySet::HOVER,
            transition_in: DEFAULT_TRANSITION_IN.to_string(),
            transition_out: DEFAULT_TRANSITION_OUT.to_string(),
        }
    }
}

impl EffectConfig {
    pub fn channel_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Holographic => self.holographic,
            Channel::Shimmer => self.shimmer,
            Channel::Glare => self.glare,
        }
    }

    pub fn enabled_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|channel| self.channel_enabled(*channel))
            .collect()
    }

    pub fn apply(&mut self, patch: &EffectConfigPatch) {
        if let Some(value) = patch.max_rotation {
            self.max_rotation = value.abs();
        }
        if let Some(value) = patch.perspective {
            self.perspective = value.max(1.0);
        }
        if let Some(value) = patch.glare_multiplier {
            self.glare_multiplier = value.max(0.0);
        }
        if let Some(value) = patch.tilt {
            self.tilt = value;
        }
        if let Some(value) = patch.holographic {
            self.holographic = value;
        }
        if let Some(value) = patch.shimmer {
            self.shimmer = value;
        }
        if let Some(value) = patch.glare {
            self.glare = value;
        }
        if let Some(idle) = &patch.idle {
            self.idle.apply(idle);
        }
        if let Some(hover) = &patch.hover {
            self.hover.apply(hover);
        }
        if let Some(value) = &patch.transition_in {
            self.transition_in = value.clone();
        }
        if let Some(value) = &patch.transition_out {
            self.transition_out = value.clone();
        }
    }

    pub fn with_patch(mut self, patch: &EffectConfigPatch) -> Self {
        self.apply(patch);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpacityPatch {
    pub holographic: Option<f32>,
    pub shimmer: Option<f32>,
    pub glare: Option<f32>,
}

impl OpacityPatch {
    fn is_empty(&self) -> bool {
        self.holographic.is_none() && self.shimmer.is_none() && self.glare.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectConfigPatch {
    pub max_rotation: Option<f32>,
    pub perspective: Option<f32>,
    pub glare_multiplier: Option<f32>,
    pub tilt: Option<bool>,
    pub holographic: Option<bool>,
    pub shimmer: Option<bool>,
    pub glare: Option<bool>,
    pub idle: Option<OpacityPatch>,
    pub hover: Option<OpacityPatch>,
    pub transition_in: Option<String>,
    pub transition_out: Option<String>,
}

pub const CONFIG_ATTRIBUTE: &str = "data-holo-config";

impl EffectConfigPatch {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Json {
            attribute: CONFIG_ATTRIBUTE,
            source,
        })
    }

    pub fn from_attributes<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut patch = match lookup(CONFIG_ATTRIBUTE) {
            Some(raw) if !raw.trim().is_empty() => Self::from_json(&raw)?,
            _ => Self::default(),
        };
        let number = |name: &'static str| -> Result<Option<f32>, ConfigError> {
            lookup(name).map(|raw| parse_number(name, &raw)).transpose()
        };
        let flag = |name: &'static str| -> Result<Option<bool>, ConfigError> {
            lookup(name).map(|raw| parse_flag(name, &raw)).transpose()
        };

        patch.max_rotation = number("data-max-rotation")?.or(patch.max_rotation);
        patch.perspective = number("data-perspective")?.or(patch.perspective);
        patch.glare_multiplier = number("data-glare-multiplier")?.or(patch.glare_multiplier);
        patch.tilt = flag("data-tilt")?.or(patch.tilt);
        patch.holographic = flag("data-holographic")?.or(patch.holographic);
        patch.shimmer = flag("data-shimmer")?.or(patch.shimmer);
        patch.glare = flag("data-glare")?.or(patch.glare);

        let mut idle = patch.idle.take().unwrap_or_default();
        idle.holographic = number("data-idle-holographic")?.or(idle.holographic);
        idle.shimmer = number("data-idle-shimmer")?.or(idle.shimmer);
        idle.glare = number("data-idle-glare")?.or(idle.glare);
        patch.idle = (!idle.is_empty()).then_some(idle);

        let mut hover = patch.hover.take().unwrap_or_default();
        hover.holographic = number("data-hover-holographic")?.or(hover.holographic);
        hover.shimmer = number("data-hover-shimmer")?.or(hover.shimmer);
        hover.glare = number("data-hover-glare")?.or(hover.glare);
        patch.hover = (!hover.is_empty()).then_some(hover);

        if let Some(value) = lookup("data-transition-in") {
            patch.transition_in = Some(value);
        }
        if let Some(value) = lookup("data-transition-out") {
            patch.transition_out = Some(value);
        }
        Ok(patch)
    }
}

fn parse_number(attribute: &'static str, raw: &str) -> Result<f32, ConfigError> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ConfigError::InvalidNumber {
            attribute,
            value: raw.to_string(),
        })
}

fn parse_flag(attribute: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            attribute,
            value: raw.to_string(),
        }),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectState {
    pub rx: f32,
    pub ry: f32,
    pub mx: f32,
    pub my: f32,
    pub active: bool,
}

impl Default for EffectState {
    fn default() -> Self {
        Self {
            rx: 0.0,
            ry: 0.0,
            mx: 50.0,
            my: 50.0,
            active: false,
        }
    }
}

impl EffectState {
    pub fn enter(&mut self) {
        self.active = true;
    }

    pub fn track(&mut self, bounds: Rect, point: Point, max_rotation: f32) -> bool {
        let Some((nx, ny)) = bounds.normalized(point) else {
            return false;
        };
        let max = max_rotation.abs();
        self.mx = nx * 100.0;
        self.my = ny * 100.0;
        self.ry = ((nx - 0.5) * 2.0 * max).clamp(-max, max);
        self.rx = (-(ny - 0.5) * 2.0 * max).clamp(-max, max);
        true
    }

    pub fn leave(&mut self) {
        self.rx = 0.0;
        self.ry = 0.0;
        self.active = false;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayerStyle {
    pub channel: Channel,
    pub background: String,
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectFrame {
    pub transform: Option<String>,
    pub layers: Vec<LayerStyle>,
}

pub fn render_frame(state: &EffectState, config: &EffectConfig, reduced_motion: bool) -> EffectFrame {
    let transform = if config.tilt && !reduced_motion {
        Some(format!(
            "perspective({:.0}px) rotateX({:.2}deg) rotateY({:.2}deg)",
            config.perspective, state.rx, state.ry
        ))
    } else {
        None
    };
    let opacities = if state.active && !reduced_motion {
        config.hover
    } else {
        config.idle
    };
    let layers = config
        .enabled_channels()
        .into_iter()
        .map(|channel| LayerStyle {
            channel,
            background: layer_background(channel, state, config),
            opacity: opacities.get(channel),
        })
        .collect();
    EffectFrame { transform, layers }
}

fn layer_background(channel: Channel, state: &EffectState, config: &EffectConfig) -> String {
    match channel {
        Channel::Holographic => color_shift_gradient(state.mx),
        Channel::Shimmer => shimmer_gradient(state.mx),
        Channel::Glare => glare_gradient(state.mx, state.my, config.glare_multiplier),
    }
}

pub fn color_shift_gradient(mx: f32) -> String {
    let hue = (mx * 3.6).rem_euclid(360.0);
    let angle = 90.0 + (mx - 50.0) * 0.9;
    let mut out = String::with_capacity(160);
    let _ = write!(out, "linear-gradient({angle:.1}deg");
    for (stop, shift) in [(0, 0.0), (50, 120.0), (100, 240.0)] {
        let h = (hue + shift).rem_euclid(360.0);
        let _ = write!(out, ", hsla({h:.0}, 100%, 70%, 0.55) {stop}%");
    }
    out.push(')');
    out
}

pub fn shimmer_gradient(mx: f32) -> String {
    let angle = 45.0 + mx * 0.9;
    format!(
        "repeating-linear-gradient({angle:.1}deg, rgba(255, 255, 255, 0) 0px, \
         rgba(255, 255, 255, 0.35) 6px, rgba(255, 255, 255, 0) 12px)"
    )
}

pub fn glare_center(mx: f32, my: f32, multiplier: f32) -> (f32, f32) {
    let gx = (50.0 + (mx - 50.0) * multiplier).clamp(0.0, 100.0);
    let gy = (50.0 + (my - 50.0) * multiplier).clamp(0.0, 100.0);
    (gx, gy)
}

pub fn glare_gradient(mx: f32, my: f32, multiplier: f32) -> String {
    let (gx, gy) = glare_center(mx, my, multiplier);
    format!(
        "radial-gradient(circle at {gx:.1}% {gy:.1}%, rgba(255, 255, 255, 0.8) 0%, \
         rgba(255, 255, 255, 0.25) 25%, rgba(255, 255, 255, 0) 60%)"
    )
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FrameGate {
    dirty: bool,
    scheduled: bool,
}

impl FrameGate {
    pub fn invalidate(&mut self) -> bool {
        self.dirty = true;
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    pub fn take_frame(&mut self) -> bool {
        self.scheduled = false;
        std::mem::take(&mut self.dirty)
    }

    pub fn cancel(&mut self) {
        self.dirty = false;
        self.scheduled = false;
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: Rect = Rect::new(100.0, 50.0, 200.0, 300.0);

    #[test]
    fn center_has_no_rotation() {
        let mut state = EffectState::default();
        assert!(state.track(CARD, CARD.center(), 15.0));
        assert_eq!((state.rx, state.ry), (0.0, 0.0));
        assert_eq!((state.mx, state.my), (50.0, 50.0));
    }

    #[test]
    fn top_left_reaches_full_rotation() {
        let mut state = EffectState::default();
        state.track(CARD, CARD.top_left(), 15.0);
        assert_eq!(state.rx, 15.0);
        assert_eq!(state.ry, -15.0);

        state.track(CARD, Point::new(CARD.right() + 40.0, CARD.bottom()), 20.0);
        assert_eq!(state.rx, -20.0);
        assert_eq!(state.ry, 20.0);
    }

    #[test]
    fn leave_keeps_cursor_memory() {
        let mut state = EffectState::default();
        state.enter();
        state.track(CARD, Point::new(150.0, 125.0), 15.0);
        state.leave();
        assert!(!state.active);
        assert_eq!((state.rx, state.ry), (0.0, 0.0));
        assert_eq!((state.mx, state.my), (25.0, 25.0));
    }

    #[test]
    fn render_uses_hover_opacity_when_active() {
        let config = EffectConfig::default();
        let mut state = EffectState::default();
        let idle = render_frame(&state, &config, false);
        assert_eq!(idle.layers.len(), 3);
        assert_eq!(idle.layers[2].opacity, 0.5);
        state.enter();
        let hover = render_frame(&state, &config, false);
        assert_eq!(hover.layers[0].opacity, 0.6);
        assert_eq!(hover.layers[2].opacity, 1.0);
        assert_eq!(
            hover.transform.as_deref(),
            Some("perspective(1000px) rotateX(0.00deg) rotateY(0.00deg)")
        );
    }

    #[test]
    fn reduced_motion_drops_transform_and_stays_idle() {
        let config = EffectConfig::default();
        let mut state = EffectState::default();
        state.enter();
        let frame = render_frame(&state, &config, true);
        assert_eq!(frame.transform, None);
        assert_eq!(frame.layers[1].opacity, 0.4);
    }

    #[test]
    fn disabled_channels_have_no_layer() {
        let patch = EffectConfigPatch {
            shimmer: Some(false),
            tilt: Some(false),
            ..EffectConfigPatch::default()
        };
        let config = EffectConfig::default().with_patch(&patch);
        let frame = render_frame(&EffectState::default(), &config, false);
        let channels: Vec<_> = frame.layers.iter().map(|layer| layer.channel).collect();
        assert_eq!(channels, vec![Channel::Holographic, Channel::Glare]);
        assert_eq!(frame.transform, None);
    }

    #[test]
    fn glare_center_is_scaled_and_clamped() {
        assert_eq!(glare_center(50.0, 50.0, 1.5), (50.0, 50.0));
        assert_eq!(glare_center(70.0, 30.0, 1.5), (80.0, 20.0));
        assert_eq!(glare_center(100.0, 0.0, 1.5), (100.0, 0.0));
    }

    #[test]
    fn gradients_follow_horizontal_position() {
        assert!(color_shift_gradient(0.0).starts_with("linear-gradient(45.0deg, hsla(0,"));
        assert!(color_shift_gradient(100.0).starts_with("linear-gradient(135.0deg, hsla(0,"));
        assert!(color_shift_gradient(50.0).contains("hsla(180, 100%, 70%, 0.55) 0%"));
        assert!(shimmer_gradient(50.0).starts_with("repeating-linear-gradient(90.0deg"));
    }

    #[test]
    fn attributes_override_json_patch() {
        let lookup = |name: &str| match name {
            "data-holo-config" => Some(r#"{"maxRotation": 8, "idle": {"glare": 0.2}}"#.to_string()),
            "data-max-rotation" => Some("22".to_string()),
            "data-shimmer" => Some("false".to_string()),
            "data-hover-glare" => Some("0.9".to_string()),
            _ => None,
        };
        let patch = EffectConfigPatch::from_attributes(lookup).expect("patch");
        assert_eq!(patch.max_rotation, Some(22.0));
        assert_eq!(patch.shimmer, Some(false));
        assert_eq!(patch.idle.as_ref().and_then(|idle| idle.glare), Some(0.2));
        assert_eq!(patch.hover.as_ref().and_then(|hover| hover.glare), Some(0.9));
        assert_eq!(patch.tilt, None);

        let config = EffectConfig::default().with_patch(&patch);
        assert_eq!(config.max_rotation, 22.0);
        assert_eq!(config.idle.glare, 0.2);
        assert_eq!(config.idle.shimmer, 0.4);
    }

    #[test]
    fn bad_attribute_values_are_rejected() {
        let lookup = |name: &str| (name == "data-perspective").then(|| "far".to_string());
        assert!(matches!(
            EffectConfigPatch::from_attributes(lookup),
            Err(ConfigError::InvalidNumber { attribute: "data-perspective", .. })
        ));
        let lookup = |name: &str| (name == "data-tilt").then(|| "maybe".to_string());
        assert!(matches!(
            EffectConfigPatch::from_attributes(lookup),
            Err(ConfigError::InvalidFlag { attribute: "data-tilt", .. })
        ));
    }

    #[test]
    fn frame_gate_coalesces_updates() {
        let mut gate = FrameGate::default();
        assert!(gate.invalidate());
        assert!(!gate.invalidate());
        assert!(!gate.invalidate());
        assert!(gate.is_scheduled());
        assert!(gate.take_frame());
        assert!(!gate.take_frame());
        assert!(gate.invalidate());
        gate.cancel();
        assert!(!gate.is_scheduled());
        assert!(!gate.take_frame());
    }
}
