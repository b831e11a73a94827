use serde::Deserialize;
use thiserror::Error;

use crate::coordinator::LayoutMode;
use crate::gesture::{DRAG_THRESHOLD_PX, HAND_HIT_PAD_PX, HOLD_DELAY_MS};
use crate::registry::TABLE_CAPACITY;

pub const DEFAULT_CARD_COUNT: usize = 5;
pub const MAX_CARD_COUNT: usize = 24;
pub const HAND_CONFIG_ATTRIBUTE: &str = "data-hand-config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{attribute}: invalid JSON: {source}")]
    Json {
        attribute: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{attribute}: expected a number, got {value:?}")]
    InvalidNumber { attribute: &'static str, value: String },
    #[error("{attribute}: expected a boolean, got {value:?}")]
    InvalidFlag { attribute: &'static str, value: String },
    #[error("{attribute}: unknown layout {value:?}")]
    InvalidLayout { attribute: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HandConfig {
    pub card_count: usize,
    pub table_capacity: usize,
    pub hold_delay_ms: u32,
    pub drag_threshold_px: f32,
    pub hand_hit_pad_px: f32,
    pub initial_layout: LayoutMode,
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            card_count: DEFAULT_CARD_COUNT,
            table_capacity: TABLE_CAPACITY,
            hold_delay_ms: HOLD_DELAY_MS,
            drag_threshold_px: DRAG_THRESHOLD_PX,
            hand_hit_pad_px: HAND_HIT_PAD_PX,
            initial_layout: LayoutMode::Fan,
        }
    }
}

impl HandConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: HandConfig =
            serde_json::from_str(raw).map_err(|source| ConfigError::Json {
                attribute: HAND_CONFIG_ATTRIBUTE,
                source,
            })?;
        Ok(config.sanitized())
    }

    pub fn apply_query<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut next = self.clone();
        if let Some(raw) = lookup("cards") {
            next.card_count = parse_count("cards", &raw)?;
        }
        if let Some(raw) = lookup("capacity") {
            next.table_capacity = parse_count("capacity", &raw)?;
        }
        if let Some(raw) = lookup("layout") {
            next.initial_layout =
                LayoutMode::parse(&raw).ok_or_else(|| ConfigError::InvalidLayout {
                    attribute: "layout",
                    value: raw.clone(),
                })?;
        }
        *self = next.sanitized();
        Ok(())
    }

    pub fn sanitized(mut self) -> Self {
        self.card_count = self.card_count.min(MAX_CARD_COUNT);
        self.drag_threshold_px = self.drag_threshold_px.max(0.0);
        self.hand_hit_pad_px = self.hand_hit_pad_px.max(0.0);
        self
    }
}

fn parse_count(attribute: &'static str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidNumber {
            attribute,
            value: raw.to_string(),
        })
}
