use crate::card::{CardId, SlotPosition, Zone};
use crate::config::HandConfig;
use crate::coordinator::{LayoutMode, PreviewState};
use crate::geometry::{Point, Rect};
use crate::gesture::{
    DropHover, GestureCommand, GestureMachine, GestureSettings, GestureState, Placeholder,
    PointerId, SessionId, Surfaces,
};
use crate::registry::{CardRegistry, MountHost, RegistryError};

pub trait HandHost: MountHost {
    fn arm_hold(&mut self, session: SessionId, delay_ms: u32);
    fn cancel_hold(&mut self, session: SessionId);
    fn lift(&mut self, card: CardId, placeholder: Placeholder);
    fn follow(&mut self, card: CardId, top_left: Point, hover: DropHover, placeholder: Placeholder);
    fn settle(&mut self, card: CardId);
    fn apply_slots(&mut self, slots: &[(CardId, SlotPosition)]);
    fn apply_layout(&mut self, mode: LayoutMode);
    fn show_preview(&mut self, card: Option<CardId>);
    fn rejected(&mut self, _card: CardId, _error: &RegistryError) {}
}

pub struct HandController<E> {
    config: HandConfig,
    registry: CardRegistry<E>,
    gesture: GestureMachine,
    layout: LayoutMode,
    preview: PreviewState<E>,
}

impl<E> HandController<E> {
    pub fn new(config: HandConfig) -> Self {
        let gesture = GestureMachine::new(gesture_settings(&config));
        Self {
            registry: CardRegistry::new(config.table_capacity),
            layout: config.initial_layout,
            preview: PreviewState::default(),
            gesture,
            config,
        }
    }

    pub fn config(&self) -> &HandConfig {
        &self.config
    }

    pub fn registry(&self) -> &CardRegistry<E> {
        &self.registry
    }

    pub fn gesture(&self) -> &GestureState {
        self.gesture.state()
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn preview(&self) -> &PreviewState<E> {
        &self.preview
    }

    pub fn initialize<H>(&mut self, host: &mut H)
    where
        H: HandHost<Engine = E>,
    {
        self.close_preview(host);
        self.gesture = GestureMachine::new(gesture_settings(&self.config));
        self.registry.initialize(self.config.card_count, host);
        host.apply_layout(self.layout);
        host.apply_slots(&self.registry.slots());
    }

    pub fn pointer_down<H>(
        &mut self,
        pointer: PointerId,
        card: CardId,
        point: Point,
        card_rect: Rect,
        host: &mut H,
    ) -> bool
    where
        H: HandHost<Engine = E>,
    {
        if self.preview.is_active() {
            return false;
        }
        let Some(origin_index) = self.registry.hand_index(card) else {
            return false;
        };
        let commands = self
            .gesture
            .pointer_down(pointer, card, point, card_rect, origin_index);
        let started = !commands.is_empty();
        self.run(commands, host);
        started
    }

    pub fn pointer_move<H>(&mut self, pointer: PointerId, point: Point, surfaces: &Surfaces, host: &mut H)
    where
        H: HandHost<Engine = E>,
    {
        let room = self.registry.table_has_room();
        let commands = self.gesture.pointer_move(pointer, point, surfaces, room);
        self.run(commands, host);
    }

    pub fn pointer_up<H>(&mut self, pointer: PointerId, point: Point, surfaces: &Surfaces, host: &mut H)
    where
        H: HandHost<Engine = E>,
    {
        let room = self.registry.table_has_room();
        let commands = self.gesture.pointer_up(pointer, point, surfaces, room);
        self.run(commands, host);
    }

    pub fn pointer_cancel<H>(&mut self, pointer: PointerId, host: &mut H)
    where
        H: HandHost<Engine = E>,
    {
        let commands = self.gesture.pointer_cancel(pointer);
        self.run(commands, host);
    }

    pub fn hold_elapsed<H>(&mut self, session: SessionId, host: &mut H)
    where
        H: HandHost<Engine = E>,
    {
        let commands = self.gesture.hold_elapsed(session);
        self.run(commands, host);
    }

    pub fn toggle_layout<H>(&mut self, host: &mut H) -> LayoutMode
    where
        H: HandHost<Engine = E>,
    {
        self.layout = self.layout.toggled();
        host.apply_layout(self.layout);
        self.layout
    }

    pub fn open_preview<H>(&mut self, card: CardId, host: &mut H) -> bool
    where
        H: HandHost<Engine = E>,
    {
        if self.registry.card(card).is_none() {
            return false;
        }
        self.close_preview(host);
        self.preview.activate(card);
        host.show_preview(Some(card));
        if let Some(engine) = host.mount(card, Zone::PreviewOnly) {
            self.preview.attach_engine(engine);
        }
        true
    }

    pub fn close_preview<H>(&mut self, host: &mut H) -> bool
    where
        H: HandHost<Engine = E>,
    {
        let Some((card, engine)) = self.preview.deactivate() else {
            return false;
        };
        if let Some(engine) = engine {
            host.unmount(card, engine);
        }
        host.show_preview(None);
        true
    }

    pub fn reset_all<H>(&mut self, host: &mut H) -> usize
    where
        H: HandHost<Engine = E>,
    {
        let moved = self.registry.reset_all(host);
        if moved > 0 {
            host.apply_slots(&self.registry.slots());
        }
        moved
    }

    fn run<H>(&mut self, commands: Vec<GestureCommand>, host: &mut H)
    where
        H: HandHost<Engine = E>,
    {
        for command in commands {
            match command {
                GestureCommand::ArmHold { session, delay_ms } => host.arm_hold(session, delay_ms),
                GestureCommand::CancelHold { session } => host.cancel_hold(session),
                GestureCommand::Lift {
                    card, placeholder, ..
                } => match self.registry.lift(card, host) {
                    Ok(_) => host.lift(card, placeholder),
                    Err(err) => host.rejected(card, &err),
                },
                GestureCommand::Follow {
                    card,
                    top_left,
                    hover,
                    placeholder,
                } => host.follow(card, top_left, hover, placeholder),
                GestureCommand::OpenPreview { card } => {
                    self.open_preview(card, host);
                }
                GestureCommand::DropOnTable { card, placeholder } => {
                    host.settle(card);
                    if let Err(err) = self.registry.move_to_table(card, host) {
                        host.rejected(card, &err);
                        if let Err(err) = self.registry.move_to_hand(card, placeholder.before, host) {
                            host.rejected(card, &err);
                        }
                    }
                    host.apply_slots(&self.registry.slots());
                }
                GestureCommand::ReturnToHand { card, before } => {
                    host.settle(card);
                    if let Err(err) = self.registry.move_to_hand(card, before, host) {
                        host.rejected(card, &err);
                    }
                    host.apply_slots(&self.registry.slots());
                }
            }
        }
    }
}

fn gesture_settings(config: &HandConfig) -> GestureSettings {
    GestureSettings {
        hold_delay_ms: config.hold_delay_ms,
        drag_threshold_px: config.drag_threshold_px,
        hand_hit_pad_px: config.hand_hit_pad_px,
    }
}
