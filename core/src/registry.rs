use thiserror::Error;

use crate::card::{Card, CardId, SlotPosition, Zone};

pub const TABLE_CAPACITY: usize = 3;

/// Presentation side of the registry. Every transfer runs
/// `unmount` (old engine) -> `place` (element relocation) -> `mount` (fresh engine).
pub trait MountHost {
    type Engine;

    fn unmount(&mut self, card: CardId, engine: Self::Engine);

    fn place(&mut self, card: CardId, zone: Zone, before: Option<CardId>);

    fn mount(&mut self, card: CardId, zone: Zone) -> Option<Self::Engine>;
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown {0}")]
    UnknownCard(CardId),
    #[error("table is full ({capacity} cards)")]
    TableFull { capacity: usize },
    #[error("{0} is already on the table")]
    AlreadyOnTable(CardId),
    #[error("{0} is not in the hand")]
    NotInHand(CardId),
}

#[derive(Debug)]
pub struct CardRegistry<E> {
    cards: Vec<Card<E>>,
    hand: Vec<CardId>,
    table: Vec<CardId>,
    capacity: usize,
}

impl<E> CardRegistry<E> {
    pub fn new(capacity: usize) -> Self {
        Self {
            cards: Vec::new(),
            hand: Vec::new(),
            table: Vec::new(),
            capacity,
        }
    }

    pub fn initialize<H>(&mut self, count: usize, host: &mut H)
    where
        H: MountHost<Engine = E>,
    {
        for card in &mut self.cards {
            if let Some(engine) = card.take_engine() {
                host.unmount(card.id(), engine);
            }
        }
        self.cards.clear();
        self.table.clear();
        self.hand.clear();
        for index in 0..count {
            let id = CardId(index as u32);
            self.cards.push(Card::new(id, SlotPosition { index, total: count }));
            self.hand.push(id);
            host.place(id, Zone::Hand, None);
            self.remount(id, host);
        }
        self.reindex();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hand(&self) -> &[CardId] {
        &self.hand
    }

    pub fn table(&self) -> &[CardId] {
        &self.table
    }

    pub fn table_has_room(&self) -> bool {
        self.table.len() < self.capacity
    }

    pub fn card(&self, id: CardId) -> Option<&Card<E>> {
        self.cards.get(id.0 as usize).filter(|card| card.id() == id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card<E>> {
        self.cards.iter()
    }

    pub fn hand_index(&self, id: CardId) -> Option<usize> {
        self.hand.iter().position(|candidate| *candidate == id)
    }

    pub fn slots(&self) -> Vec<(CardId, SlotPosition)> {
        self.hand
            .iter()
            .chain(self.table.iter())
            .filter_map(|id| self.card(*id).map(|card| (*id, card.slot())))
            .collect()
    }

    pub fn reindex(&mut self) {
        let total = self.hand.len();
        for index in 0..total {
            let id = self.hand[index];
            if let Some(card) = self.card_mut(id) {
                card.set_slot(SlotPosition { index, total });
            }
        }
        for index in 0..self.table.len() {
            let id = self.table[index];
            if let Some(card) = self.card_mut(id) {
                card.set_slot(SlotPosition::SINGLETON);
            }
        }
    }

    pub fn lift<H>(&mut self, id: CardId, host: &mut H) -> Result<usize, RegistryError>
    where
        H: MountHost<Engine = E>,
    {
        let card = self.card_mut(id).ok_or(RegistryError::UnknownCard(id))?;
        if card.zone() != Zone::Hand {
            return Err(RegistryError::NotInHand(id));
        }
        let engine = card.take_engine();
        card.set_zone(Zone::Dragging);
        if let Some(engine) = engine {
            host.unmount(id, engine);
        }
        let index = self.hand_index(id).ok_or(RegistryError::NotInHand(id))?;
        self.hand.remove(index);
        Ok(index)
    }

    pub fn move_to_table<H>(&mut self, id: CardId, host: &mut H) -> Result<(), RegistryError>
    where
        H: MountHost<Engine = E>,
    {
        let zone = self.card(id).ok_or(RegistryError::UnknownCard(id))?.zone();
        if zone == Zone::Table {
            return Err(RegistryError::AlreadyOnTable(id));
        }
        if !self.table_has_room() {
            return Err(RegistryError::TableFull {
                capacity: self.capacity,
            });
        }
        self.detach(id, host);
        self.table.push(id);
        if let Some(card) = self.card_mut(id) {
            card.set_zone(Zone::Table);
            card.set_slot(SlotPosition::SINGLETON);
        }
        host.place(id, Zone::Table, None);
        self.remount(id, host);
        self.reindex();
        Ok(())
    }

    pub fn move_to_hand<H>(
        &mut self,
        id: CardId,
        before: Option<CardId>,
        host: &mut H,
    ) -> Result<(), RegistryError>
    where
        H: MountHost<Engine = E>,
    {
        self.transfer_to_hand(id, before, host)?;
        self.reindex();
        Ok(())
    }

    pub fn reset_all<H>(&mut self, host: &mut H) -> usize
    where
        H: MountHost<Engine = E>,
    {
        let table = self.table.clone();
        let mut moved = 0;
        for id in table {
            if self.transfer_to_hand(id, None, host).is_ok() {
                moved += 1;
            }
        }
        if moved > 0 {
            self.reindex();
        }
        moved
    }

    fn transfer_to_hand<H>(
        &mut self,
        id: CardId,
        before: Option<CardId>,
        host: &mut H,
    ) -> Result<(), RegistryError>
    where
        H: MountHost<Engine = E>,
    {
        if self.card(id).is_none() {
            return Err(RegistryError::UnknownCard(id));
        }
        self.detach(id, host);
        let before = before.filter(|target| *target != id && self.hand.contains(target));
        match before.and_then(|target| self.hand_index(target)) {
            Some(index) => self.hand.insert(index, id),
            None => self.hand.push(id),
        }
        if let Some(card) = self.card_mut(id) {
            card.set_zone(Zone::Hand);
        }
        host.place(id, Zone::Hand, before);
        self.remount(id, host);
        Ok(())
    }

    fn detach<H>(&mut self, id: CardId, host: &mut H)
    where
        H: MountHost<Engine = E>,
    {
        if let Some(engine) = self.card_mut(id).and_then(|card| card.take_engine()) {
            host.unmount(id, engine);
        }
        self.hand.retain(|candidate| *candidate != id);
        self.table.retain(|candidate| *candidate != id);
    }

    fn remount<H>(&mut self, id: CardId, host: &mut H)
    where
        H: MountHost<Engine = E>,
    {
        let Some(card) = self.card_mut(id) else {
            return;
        };
        if let Some(engine) = card.take_engine() {
            host.unmount(id, engine);
        }
        let zone = card.zone();
        if !zone.is_mounted() {
            return;
        }
        if let Some(engine) = host.mount(id, zone) {
            if let Some(card) = self.card_mut(id) {
                card.attach_engine(engine);
            }
        }
    }

    fn card_mut(&mut self, id: CardId) -> Option<&mut Card<E>> {
        self.cards.get_mut(id.0 as usize).filter(|card| card.id() == id)
    }
}
