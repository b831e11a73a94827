use crate::card::CardId;
use crate::geometry::{Point, Rect};

pub const HOLD_DELAY_MS: u32 = 400;
pub const DRAG_THRESHOLD_PX: f32 = 8.0;
pub const HAND_HIT_PAD_PX: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerId(pub i32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

#[derive(Clone, Copy, Debug)]
pub struct DragSlopGate {
    start: Point,
    slop: f32,
    moved: bool,
}

impl DragSlopGate {
    pub fn new(start: Point, slop: f32) -> Self {
        Self {
            start,
            slop,
            moved: false,
        }
    }

    pub fn update(&mut self, point: Point) -> bool {
        if self.moved {
            return true;
        }
        let dx = point.x - self.start.x;
        let dy = point.y - self.start.y;
        if dx * dx + dy * dy > self.slop * self.slop {
            self.moved = true;
        }
        self.moved
    }
}

/// Where the dragged card lands if released now: `slot` counts the other hand
/// cards, `before` is the card it would be inserted in front of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placeholder {
    pub slot: usize,
    pub before: Option<CardId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropHover {
    None,
    Hand,
    Eligible,
    Full,
}

#[derive(Clone, Debug, Default)]
pub struct Surfaces {
    pub table: Rect,
    pub hand: Rect,
    pub hand_slots: Vec<(CardId, Rect)>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSettings {
    pub hold_delay_ms: u32,
    pub drag_threshold_px: f32,
    pub hand_hit_pad_px: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            hold_delay_ms: HOLD_DELAY_MS,
            drag_threshold_px: DRAG_THRESHOLD_PX,
            hand_hit_pad_px: HAND_HIT_PAD_PX,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PendingGesture {
    pub session: SessionId,
    pub card: CardId,
    pub pointer: PointerId,
    pub start: Point,
    pub grab_offset: Point,
    pub origin_index: usize,
    gate: DragSlopGate,
}

#[derive(Clone, Debug)]
pub struct DragSession {
    pub session: SessionId,
    pub card: CardId,
    pub pointer: PointerId,
    pub grab_offset: Point,
    pub origin_index: usize,
    pub placeholder: Placeholder,
    pub hover: DropHover,
    pub last: Point,
}

#[derive(Clone, Debug, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Pending(PendingGesture),
    Dragging(DragSession),
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    pub fn card(&self) -> Option<CardId> {
        match self {
            GestureState::Idle => None,
            GestureState::Pending(pending) => Some(pending.card),
            GestureState::Dragging(drag) => Some(drag.card),
        }
    }

    fn pointer(&self) -> Option<PointerId> {
        match self {
            GestureState::Idle => None,
            GestureState::Pending(pending) => Some(pending.pointer),
            GestureState::Dragging(drag) => Some(drag.pointer),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GestureCommand {
    ArmHold {
        session: SessionId,
        delay_ms: u32,
    },
    CancelHold {
        session: SessionId,
    },
    Lift {
        card: CardId,
        origin_index: usize,
        placeholder: Placeholder,
    },
    Follow {
        card: CardId,
        top_left: Point,
        hover: DropHover,
        placeholder: Placeholder,
    },
    OpenPreview {
        card: CardId,
    },
    DropOnTable {
        card: CardId,
        placeholder: Placeholder,
    },
    ReturnToHand {
        card: CardId,
        before: Option<CardId>,
    },
}

#[derive(Debug, Default)]
pub struct GestureMachine {
    settings: GestureSettings,
    state: GestureState,
    next_session: u64,
}

impl GestureMachine {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings,
            state: GestureState::Idle,
            next_session: 0,
        }
    }

    pub fn settings(&self) -> GestureSettings {
        self.settings
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        card: CardId,
        point: Point,
        card_rect: Rect,
        origin_index: usize,
    ) -> Vec<GestureCommand> {
        if !self.state.is_idle() {
            return Vec::new();
        }
        self.next_session += 1;
        let session = SessionId(self.next_session);
        self.state = GestureState::Pending(PendingGesture {
            session,
            card,
            pointer,
            start: point,
            grab_offset: point.offset_from(card_rect.top_left()),
            origin_index,
            gate: DragSlopGate::new(point, self.settings.drag_threshold_px),
        });
        vec![GestureCommand::ArmHold {
            session,
            delay_ms: self.settings.hold_delay_ms,
        }]
    }

    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        point: Point,
        surfaces: &Surfaces,
        table_has_room: bool,
    ) -> Vec<GestureCommand> {
        if self.state.pointer() != Some(pointer) {
            return Vec::new();
        }
        match std::mem::take(&mut self.state) {
            GestureState::Pending(mut pending) => {
                if !pending.gate.update(point) {
                    self.state = GestureState::Pending(pending);
                    return Vec::new();
                }
                let placeholder =
                    initial_placeholder(pending.card, pending.origin_index, &surfaces.hand_slots);
                let mut drag = DragSession {
                    session: pending.session,
                    card: pending.card,
                    pointer: pending.pointer,
                    grab_offset: pending.grab_offset,
                    origin_index: pending.origin_index,
                    placeholder,
                    hover: DropHover::None,
                    last: point,
                };
                let follow = self.drag_step(&mut drag, point, surfaces, table_has_room);
                let commands = vec![
                    GestureCommand::CancelHold {
                        session: pending.session,
                    },
                    GestureCommand::Lift {
                        card: pending.card,
                        origin_index: pending.origin_index,
                        placeholder,
                    },
                    follow,
                ];
                self.state = GestureState::Dragging(drag);
                commands
            }
            GestureState::Dragging(mut drag) => {
                let follow = self.drag_step(&mut drag, point, surfaces, table_has_room);
                self.state = GestureState::Dragging(drag);
                vec![follow]
            }
            GestureState::Idle => Vec::new(),
        }
    }

    pub fn hold_elapsed(&mut self, session: SessionId) -> Vec<GestureCommand> {
        match &self.state {
            GestureState::Pending(pending) if pending.session == session => {
                let card = pending.card;
                self.state = GestureState::Idle;
                vec![GestureCommand::OpenPreview { card }]
            }
            _ => Vec::new(),
        }
    }

    pub fn pointer_up(
        &mut self,
        pointer: PointerId,
        point: Point,
        surfaces: &Surfaces,
        table_has_room: bool,
    ) -> Vec<GestureCommand> {
        if self.state.pointer() != Some(pointer) {
            return Vec::new();
        }
        match std::mem::take(&mut self.state) {
            GestureState::Pending(pending) => vec![GestureCommand::CancelHold {
                session: pending.session,
            }],
            GestureState::Dragging(drag) => {
                if table_has_room && surfaces.table.contains(point) {
                    vec![GestureCommand::DropOnTable {
                        card: drag.card,
                        placeholder: drag.placeholder,
                    }]
                } else {
                    vec![GestureCommand::ReturnToHand {
                        card: drag.card,
                        before: drag.placeholder.before,
                    }]
                }
            }
            GestureState::Idle => Vec::new(),
        }
    }

    pub fn pointer_cancel(&mut self, pointer: PointerId) -> Vec<GestureCommand> {
        if self.state.pointer() != Some(pointer) {
            return Vec::new();
        }
        match std::mem::take(&mut self.state) {
            GestureState::Pending(pending) => vec![GestureCommand::CancelHold {
                session: pending.session,
            }],
            GestureState::Dragging(drag) => vec![GestureCommand::ReturnToHand {
                card: drag.card,
                before: drag.placeholder.before,
            }],
            GestureState::Idle => Vec::new(),
        }
    }

    fn drag_step(
        &self,
        drag: &mut DragSession,
        point: Point,
        surfaces: &Surfaces,
        table_has_room: bool,
    ) -> GestureCommand {
        drag.last = point;
        drag.hover = if surfaces.table.contains(point) {
            if table_has_room {
                DropHover::Eligible
            } else {
                DropHover::Full
            }
        } else if surfaces
            .hand
            .pad_vertical(self.settings.hand_hit_pad_px)
            .contains(point)
        {
            drag.placeholder = placeholder_at(point.x, drag.card, &surfaces.hand_slots);
            DropHover::Hand
        } else {
            DropHover::None
        };
        GestureCommand::Follow {
            card: drag.card,
            top_left: point.offset_from(drag.grab_offset),
            hover: drag.hover,
            placeholder: drag.placeholder,
        }
    }
}

pub fn placeholder_at(x: f32, dragged: CardId, slots: &[(CardId, Rect)]) -> Placeholder {
    let mut slot = 0;
    for (id, rect) in slots.iter().filter(|(id, _)| *id != dragged) {
        if rect.mid_x() > x {
            return Placeholder {
                slot,
                before: Some(*id),
            };
        }
        slot += 1;
    }
    Placeholder { slot, before: None }
}

fn initial_placeholder(card: CardId, origin_index: usize, slots: &[(CardId, Rect)]) -> Placeholder {
    let others: Vec<CardId> = slots
        .iter()
        .map(|(id, _)| *id)
        .filter(|id| *id != card)
        .collect();
    let slot = origin_index.min(others.len());
    Placeholder {
        slot,
        before: others.get(slot).copied(),
    }
}
