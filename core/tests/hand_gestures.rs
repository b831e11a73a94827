use std::collections::BTreeMap;

use cardhand_core::{
    CardId, DropHover, HandConfig, HandController, HandHost, LayoutMode, MountHost, Placeholder,
    Point, PointerId, Rect, RegistryError, SessionId, SlotPosition, Surfaces, Zone,
};
use proptest::prelude::*;

const CARD_W: f32 = 100.0;
const CARD_H: f32 = 140.0;
const HAND_TOP: f32 = 400.0;
const TABLE: Rect = Rect::new(0.0, 0.0, 800.0, 200.0);
const MOUSE: PointerId = PointerId(1);

#[derive(Debug, Clone, PartialEq)]
enum HostEvent {
    Arm(SessionId),
    Cancel(SessionId),
    Lift(CardId, Placeholder),
    Settle(CardId),
    Preview(Option<CardId>),
    Layout(LayoutMode),
}

#[derive(Default)]
struct RecordingHost {
    next_engine: u64,
    live: BTreeMap<u64, (CardId, Zone)>,
    events: Vec<HostEvent>,
    last_follow: Option<(CardId, Point, DropHover, Placeholder)>,
    slots: BTreeMap<CardId, SlotPosition>,
    rejected: Vec<RegistryError>,
}

impl RecordingHost {
    fn count(&self, wanted: impl Fn(&HostEvent) -> bool) -> usize {
        self.events.iter().filter(|event| wanted(event)).count()
    }

    fn armed(&self) -> Option<SessionId> {
        self.events.iter().rev().find_map(|event| match event {
            HostEvent::Arm(session) => Some(*session),
            _ => None,
        })
    }
}

impl MountHost for RecordingHost {
    type Engine = u64;

    fn unmount(&mut self, _card: CardId, engine: u64) {
        assert!(self.live.remove(&engine).is_some(), "engine {engine} unmounted twice");
    }

    fn place(&mut self, _card: CardId, _zone: Zone, _before: Option<CardId>) {}

    fn mount(&mut self, card: CardId, zone: Zone) -> Option<u64> {
        self.next_engine += 1;
        self.live.insert(self.next_engine, (card, zone));
        Some(self.next_engine)
    }
}

impl HandHost for RecordingHost {
    fn arm_hold(&mut self, session: SessionId, _delay_ms: u32) {
        self.events.push(HostEvent::Arm(session));
    }

    fn cancel_hold(&mut self, session: SessionId) {
        self.events.push(HostEvent::Cancel(session));
    }

    fn lift(&mut self, card: CardId, placeholder: Placeholder) {
        self.events.push(HostEvent::Lift(card, placeholder));
    }

    fn follow(&mut self, card: CardId, top_left: Point, hover: DropHover, placeholder: Placeholder) {
        self.last_follow = Some((card, top_left, hover, placeholder));
    }

    fn settle(&mut self, card: CardId) {
        self.events.push(HostEvent::Settle(card));
    }

    fn apply_slots(&mut self, slots: &[(CardId, SlotPosition)]) {
        for (card, slot) in slots {
            self.slots.insert(*card, *slot);
        }
    }

    fn apply_layout(&mut self, mode: LayoutMode) {
        self.events.push(HostEvent::Layout(mode));
    }

    fn show_preview(&mut self, card: Option<CardId>) {
        self.events.push(HostEvent::Preview(card));
    }

    fn rejected(&mut self, _card: CardId, error: &RegistryError) {
        self.rejected.push(error.clone());
    }
}

fn setup(cards: usize, capacity: usize) -> (HandController<u64>, RecordingHost) {
    let config = HandConfig {
        card_count: cards,
        table_capacity: capacity,
        ..HandConfig::default()
    };
    let mut controller = HandController::new(config);
    let mut host = RecordingHost::default();
    controller.initialize(&mut host);
    (controller, host)
}

fn card_rect(index: usize) -> Rect {
    Rect::new(index as f32 * CARD_W, HAND_TOP, CARD_W, CARD_H)
}

/// Lays the current hand out in a row, the way the page would measure it.
fn surfaces(controller: &HandController<u64>) -> Surfaces {
    let hand = controller.registry().hand();
    Surfaces {
        table: TABLE,
        hand: Rect::new(0.0, HAND_TOP, hand.len().max(1) as f32 * CARD_W, CARD_H),
        hand_slots: hand
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, card_rect(index)))
            .collect(),
    }
}

fn press(controller: &mut HandController<u64>, host: &mut RecordingHost, card: CardId) -> Point {
    let index = controller.registry().hand_index(card).expect("hand card");
    let rect = card_rect(index);
    let point = rect.center();
    assert!(controller.pointer_down(MOUSE, card, point, rect, host));
    point
}

fn drag_to(controller: &mut HandController<u64>, host: &mut RecordingHost, point: Point) {
    let surfaces = surfaces(controller);
    controller.pointer_move(MOUSE, point, &surfaces, host);
}

fn release(controller: &mut HandController<u64>, host: &mut RecordingHost, point: Point) {
    let surfaces = surfaces(controller);
    controller.pointer_up(MOUSE, point, &surfaces, host);
}

fn engine_of(controller: &HandController<u64>, card: CardId) -> Option<u64> {
    controller
        .registry()
        .card(card)
        .and_then(|card| card.engine().copied())
}

#[test]
fn initialize_applies_layout_and_slots() {
    let (controller, host) = setup(4, 3);
    assert_eq!(controller.registry().hand().len(), 4);
    assert_eq!(host.live.len(), 4);
    assert_eq!(host.count(|event| *event == HostEvent::Layout(LayoutMode::Fan)), 1);
    assert_eq!(
        host.slots.get(&CardId(3)),
        Some(&SlotPosition { index: 3, total: 4 })
    );
}

#[test]
fn hold_opens_preview_once_and_clears_session() {
    let (mut controller, mut host) = setup(4, 3);
    press(&mut controller, &mut host, CardId(2));
    let session = host.armed().expect("hold armed");

    controller.hold_elapsed(session, &mut host);
    assert!(controller.gesture().is_idle());
    assert_eq!(controller.preview().card(), Some(CardId(2)));
    assert!(controller.preview().has_engine());
    assert_eq!(host.count(|event| *event == HostEvent::Preview(Some(CardId(2)))), 1);

    controller.hold_elapsed(session, &mut host);
    assert_eq!(host.count(|event| matches!(event, HostEvent::Preview(Some(_)))), 1);

    // the gesture that opened the preview never reaches pointer-up handling
    release(&mut controller, &mut host, card_rect(2).center());
    assert_eq!(host.count(|event| matches!(event, HostEvent::Cancel(_))), 0);

    assert!(controller.close_preview(&mut host));
    assert!(!controller.preview().is_active());
    assert_eq!(host.live.len(), 4);
    assert!(host.live.values().all(|(_, zone)| *zone != Zone::PreviewOnly));
}

#[test]
fn preview_blocks_new_gestures() {
    let (mut controller, mut host) = setup(3, 3);
    assert!(controller.open_preview(CardId(0), &mut host));
    let rect = card_rect(1);
    assert!(!controller.pointer_down(MOUSE, CardId(1), rect.center(), rect, &mut host));
    assert!(controller.gesture().is_idle());
}

#[test]
fn released_press_cancels_hold_and_stale_timer_is_ignored() {
    let (mut controller, mut host) = setup(4, 3);
    let point = press(&mut controller, &mut host, CardId(1));
    let session = host.armed().expect("armed");
    release(&mut controller, &mut host, point);
    assert_eq!(host.count(|event| *event == HostEvent::Cancel(session)), 1);

    controller.hold_elapsed(session, &mut host);
    assert!(!controller.preview().is_active());
    assert!(controller.gesture().is_idle());
}

#[test]
fn second_pointer_is_ignored_while_session_runs() {
    let (mut controller, mut host) = setup(4, 3);
    press(&mut controller, &mut host, CardId(0));
    let rect = card_rect(3);
    assert!(!controller.pointer_down(PointerId(7), CardId(3), rect.center(), rect, &mut host));
    assert_eq!(controller.gesture().card(), Some(CardId(0)));

    let surfaces = surfaces(&controller);
    controller.pointer_up(PointerId(7), rect.center(), &surfaces, &mut host);
    assert_eq!(controller.gesture().card(), Some(CardId(0)));
}

#[test]
fn drag_promotion_lifts_card_with_placeholder_at_origin() {
    let (mut controller, mut host) = setup(4, 3);
    let start = press(&mut controller, &mut host, CardId(1));
    let session = host.armed().expect("armed");
    drag_to(&mut controller, &mut host, Point::new(start.x, start.y - 30.0));

    assert_eq!(host.count(|event| *event == HostEvent::Cancel(session)), 1);
    assert_eq!(
        host.count(|event| *event
            == HostEvent::Lift(
                CardId(1),
                Placeholder {
                    slot: 1,
                    before: Some(CardId(2))
                }
            )),
        1
    );
    let card = controller.registry().card(CardId(1)).expect("card");
    assert_eq!(card.zone(), Zone::Dragging);
    assert!(!card.has_engine());
    assert_eq!(host.live.len(), 3);

    let (card, top_left, hover, _) = host.last_follow.expect("follow");
    assert_eq!(card, CardId(1));
    assert_eq!(top_left, Point::new(100.0, 370.0));
    assert_eq!(hover, DropHover::Hand);

    // a late hold timer for the promoted session does nothing
    controller.hold_elapsed(session, &mut host);
    assert!(!controller.preview().is_active());
}

#[test]
fn drop_on_table_with_room_plays_the_card() {
    let (mut controller, mut host) = setup(5, 3);
    press(&mut controller, &mut host, CardId(3));
    let over_table = Point::new(300.0, 100.0);
    drag_to(&mut controller, &mut host, over_table);
    assert_eq!(host.last_follow.map(|follow| follow.2), Some(DropHover::Eligible));
    release(&mut controller, &mut host, over_table);

    let registry = controller.registry();
    assert_eq!(registry.table(), &[CardId(3)]);
    assert_eq!(registry.hand().len(), 4);
    let card = registry.card(CardId(3)).expect("card");
    assert_eq!(card.zone(), Zone::Table);
    assert_eq!(card.slot(), SlotPosition::SINGLETON);
    assert_eq!(host.slots.get(&CardId(3)), Some(&SlotPosition::SINGLETON));
    assert_eq!(
        host.slots.get(&CardId(4)),
        Some(&SlotPosition { index: 3, total: 4 })
    );
    let engine = engine_of(&controller, CardId(3)).expect("engine");
    assert_eq!(host.live.get(&engine), Some(&(CardId(3), Zone::Table)));
    assert_eq!(host.count(|event| *event == HostEvent::Settle(CardId(3))), 1);
    assert!(controller.gesture().is_idle());
}

#[test]
fn drop_on_full_table_returns_to_placeholder() {
    let (mut controller, mut host) = setup(6, 3);
    for _ in 0..3 {
        let card = controller.registry().hand()[0];
        press(&mut controller, &mut host, card);
        drag_to(&mut controller, &mut host, Point::new(50.0, 50.0));
        release(&mut controller, &mut host, Point::new(50.0, 50.0));
    }
    assert_eq!(controller.registry().table().len(), 3);
    let hand_before = controller.registry().hand().to_vec();
    assert_eq!(hand_before, vec![CardId(3), CardId(4), CardId(5)]);

    press(&mut controller, &mut host, CardId(5));
    // over the hand, left of card 4's midpoint
    drag_to(&mut controller, &mut host, Point::new(120.0, 450.0));
    drag_to(&mut controller, &mut host, Point::new(400.0, 100.0));
    assert_eq!(host.last_follow.map(|follow| follow.2), Some(DropHover::Full));
    release(&mut controller, &mut host, Point::new(400.0, 100.0));

    assert_eq!(controller.registry().table().len(), 3);
    assert_eq!(
        controller.registry().hand(),
        &[CardId(3), CardId(5), CardId(4)]
    );
    assert!(host.rejected.is_empty());
    let engine = engine_of(&controller, CardId(5)).expect("engine");
    assert_eq!(host.live.get(&engine), Some(&(CardId(5), Zone::Hand)));
}

#[test]
fn drop_outside_everything_returns_to_last_placeholder() {
    let (mut controller, mut host) = setup(4, 3);
    press(&mut controller, &mut host, CardId(0));
    drag_to(&mut controller, &mut host, Point::new(390.0, 470.0));
    drag_to(&mut controller, &mut host, Point::new(900.0, 900.0));
    assert_eq!(host.last_follow.map(|follow| follow.2), Some(DropHover::None));
    release(&mut controller, &mut host, Point::new(900.0, 900.0));
    assert_eq!(
        controller.registry().hand(),
        &[CardId(1), CardId(2), CardId(3), CardId(0)]
    );
}

#[test]
fn pointer_cancel_returns_dragged_card() {
    let (mut controller, mut host) = setup(3, 3);
    press(&mut controller, &mut host, CardId(2));
    drag_to(&mut controller, &mut host, Point::new(10.0, 460.0));
    controller.pointer_cancel(MOUSE, &mut host);
    assert_eq!(controller.registry().hand(), &[CardId(2), CardId(0), CardId(1)]);
    assert!(controller.gesture().is_idle());
    assert_eq!(host.live.len(), 3);
}

#[test]
fn reset_all_moves_table_back_with_fresh_engines() {
    let (mut controller, mut host) = setup(5, 3);
    assert_eq!(controller.reset_all(&mut host), 0);
    assert_eq!(controller.registry().hand().len(), 5);

    for _ in 0..2 {
        let card = controller.registry().hand()[1];
        press(&mut controller, &mut host, card);
        drag_to(&mut controller, &mut host, Point::new(200.0, 20.0));
        release(&mut controller, &mut host, Point::new(200.0, 20.0));
    }
    let played = controller.registry().table().to_vec();
    assert_eq!(played, vec![CardId(1), CardId(2)]);
    let old_engines: Vec<u64> = played
        .iter()
        .filter_map(|card| engine_of(&controller, *card))
        .collect();

    assert_eq!(controller.reset_all(&mut host), 2);
    let registry = controller.registry();
    assert!(registry.table().is_empty());
    assert_eq!(
        registry.hand(),
        &[CardId(0), CardId(3), CardId(4), CardId(1), CardId(2)]
    );
    for card in &played {
        let engine = engine_of(&controller, *card).expect("engine");
        assert!(!old_engines.contains(&engine));
        assert_eq!(host.live.get(&engine), Some(&(*card, Zone::Hand)));
    }
    assert_eq!(
        host.slots.get(&CardId(2)),
        Some(&SlotPosition { index: 4, total: 5 })
    );
    assert_eq!(host.live.len(), 5);
}

#[test]
fn toggle_layout_reports_mode() {
    let (mut controller, mut host) = setup(2, 3);
    assert_eq!(controller.toggle_layout(&mut host), LayoutMode::Flat);
    assert_eq!(controller.toggle_layout(&mut host), LayoutMode::Fan);
    assert_eq!(host.count(|event| *event == HostEvent::Layout(LayoutMode::Flat)), 1);
}

proptest! {
    #[test]
    fn small_moves_then_release_change_nothing(
        card in 0u32..5,
        moves in prop::collection::vec((-5.5f32..5.5, -5.5f32..5.5), 0..8),
    ) {
        let (mut controller, mut host) = setup(5, 3);
        let hand_before = controller.registry().hand().to_vec();
        let start = press(&mut controller, &mut host, CardId(card));
        for (dx, dy) in &moves {
            drag_to(&mut controller, &mut host, Point::new(start.x + dx, start.y + dy));
        }
        let last = moves
            .last()
            .map(|(dx, dy)| Point::new(start.x + dx, start.y + dy))
            .unwrap_or(start);
        release(&mut controller, &mut host, last);

        prop_assert_eq!(controller.registry().hand(), hand_before.as_slice());
        prop_assert!(controller.registry().table().is_empty());
        prop_assert_eq!(host.count(|event| matches!(event, HostEvent::Lift(..))), 0);
        prop_assert!(controller.gesture().is_idle());
        prop_assert_eq!(host.live.len(), 5);
    }

    #[test]
    fn reorder_lands_where_the_placeholder_says(
        cards in 2usize..8,
        pick in 0usize..8,
        along in 0.0f32..1.0,
    ) {
        let (mut controller, mut host) = setup(cards, 3);
        // stays over the hand once the dragged card leaves the row
        let drop_x = along * (cards - 1) as f32 * CARD_W;
        let card = CardId((pick % cards) as u32);
        press(&mut controller, &mut host, card);
        drag_to(&mut controller, &mut host, Point::new(drop_x, HAND_TOP - 20.0));
        let surfaces = surfaces(&controller);
        let point = Point::new(drop_x, HAND_TOP + 10.0);
        controller.pointer_move(MOUSE, point, &surfaces, &mut host);

        let others: Vec<CardId> = controller.registry().hand().to_vec();
        let slot = (0..others.len())
            .position(|index| card_rect(index).mid_x() > drop_x)
            .unwrap_or(others.len());
        let mut expected = others.clone();
        expected.insert(slot, card);

        controller.pointer_up(MOUSE, point, &surfaces, &mut host);
        let hand = controller.registry().hand().to_vec();
        prop_assert_eq!(&hand, &expected);

        let mut sorted = hand.clone();
        sorted.sort();
        let all: Vec<CardId> = (0..cards as u32).map(CardId).collect();
        prop_assert_eq!(sorted, all);
        prop_assert!(controller.registry().table().is_empty());
        for (index, id) in hand.iter().enumerate() {
            let slot = controller.registry().card(*id).map(|card| card.slot());
            prop_assert_eq!(slot, Some(SlotPosition { index, total: cards }));
        }
    }
}
