use serde::Deserialize;

use crate::card::CardId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Fan,
    Flat,
}

impl LayoutMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fan" => Some(LayoutMode::Fan),
            "flat" => Some(LayoutMode::Flat),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LayoutMode::Fan => LayoutMode::Flat,
            LayoutMode::Flat => LayoutMode::Fan,
        }
    }

    pub fn is_flat(self) -> bool {
        self == LayoutMode::Flat
    }

    pub fn toggle_label(self) -> &'static str {
        match self {
            LayoutMode::Fan => "Flat layout",
            LayoutMode::Flat => "Fan layout",
        }
    }
}

#[derive(Debug)]
pub struct PreviewState<E> {
    card: Option<CardId>,
    engine: Option<E>,
}

impl<E> Default for PreviewState<E> {
    fn default() -> Self {
        Self {
            card: None,
            engine: None,
        }
    }
}

impl<E> PreviewState<E> {
    pub fn is_active(&self) -> bool {
        self.card.is_some()
    }

    pub fn card(&self) -> Option<CardId> {
        self.card
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    pub(crate) fn activate(&mut self, card: CardId) {
        self.card = Some(card);
    }

    pub(crate) fn attach_engine(&mut self, engine: E) {
        debug_assert!(self.engine.is_none(), "preview already has an engine");
        self.engine = Some(engine);
    }

    pub(crate) fn deactivate(&mut self) -> Option<(CardId, Option<E>)> {
        let card = self.card.take()?;
        Some((card, self.engine.take()))
    }
}
