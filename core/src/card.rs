use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Zone {
    Hand,
    Table,
    Dragging,
    PreviewOnly,
}

impl Zone {
    pub fn is_mounted(self) -> bool {
        !matches!(self, Zone::Dragging)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotPosition {
    pub index: usize,
    pub total: usize,
}

impl SlotPosition {
    pub const SINGLETON: SlotPosition = SlotPosition { index: 0, total: 1 };
}

#[derive(Debug)]
pub struct Card<E> {
    id: CardId,
    zone: Zone,
    slot: SlotPosition,
    engine: Option<E>,
}

impl<E> Card<E> {
    pub(crate) fn new(id: CardId, slot: SlotPosition) -> Self {
        Self {
            id,
            zone: Zone::Hand,
            slot,
            engine: None,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn slot(&self) -> SlotPosition {
        self.slot
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    pub(crate) fn set_zone(&mut self, zone: Zone) {
        self.zone = zone;
    }

    pub(crate) fn set_slot(&mut self, slot: SlotPosition) {
        self.slot = slot;
    }

    pub(crate) fn take_engine(&mut self) -> Option<E> {
        self.engine.take()
    }

    // Callers take the previous engine out first; a second attach is a bug.
    pub(crate) fn attach_engine(&mut self, engine: E) {
        debug_assert!(self.engine.is_none(), "{} already has an engine", self.id);
        self.engine = Some(engine);
    }
}
