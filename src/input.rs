use wasm_bindgen::JsCast;
use web_sys::{Element, Event, PointerEvent, TouchEvent};

use cardhand_core::{CardId, Point, PointerId, Rect};

pub(crate) const CARD_ID_ATTRIBUTE: &str = "data-card-id";
const CARD_SELECTOR: &str = "[data-card-id]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PointerKind {
    Mouse,
    Touch,
    Pen,
    Unknown,
}

impl PointerKind {
    fn from_event(event: &PointerEvent) -> Self {
        match event.pointer_type().as_str() {
            "mouse" => PointerKind::Mouse,
            "touch" => PointerKind::Touch,
            "pen" => PointerKind::Pen,
            _ => PointerKind::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct PointerSample {
    pub id: PointerId,
    pub kind: PointerKind,
    pub point: Point,
    pub button: i16,
}

impl PointerSample {
    pub(crate) fn from_event(event: &Event) -> Option<Self> {
        let event = event.dyn_ref::<PointerEvent>()?;
        Some(Self {
            id: PointerId(event.pointer_id()),
            kind: PointerKind::from_event(event),
            point: Point::new(event.client_x() as f32, event.client_y() as f32),
            button: event.button(),
        })
    }

    // Mouse presses count only for the primary button; touch and pen always do.
    pub(crate) fn is_primary_press(&self) -> bool {
        self.kind != PointerKind::Mouse || self.button == 0
    }
}

pub(crate) fn client_rect(element: &Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(
        rect.left() as f32,
        rect.top() as f32,
        rect.width() as f32,
        rect.height() as f32,
    )
}

pub(crate) fn first_touch_point(event: &Event) -> Option<Point> {
    let event = event.dyn_ref::<TouchEvent>()?;
    let touch = event.touches().get(0)?;
    Some(Point::new(touch.client_x() as f32, touch.client_y() as f32))
}

pub(crate) fn card_from_event(event: &Event) -> Option<(CardId, Element)> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let card = target.closest(CARD_SELECTOR).ok()??;
    let id = parse_card_id(&card.get_attribute(CARD_ID_ATTRIBUTE)?)?;
    Some((id, card))
}

pub(crate) fn parse_card_id(raw: &str) -> Option<CardId> {
    raw.trim().parse::<u32>().ok().map(CardId)
}
