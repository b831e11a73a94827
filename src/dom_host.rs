use std::collections::HashMap;
use std::rc::Rc;

use gloo::console;
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement};

use cardhand_core::{
    CardId, DropHover, EffectConfig, HandHost, LayoutMode, MountHost, Placeholder, Point, Rect,
    RegistryError, SessionId, SlotPosition, Surfaces, Zone,
};

use crate::effect_engine::EffectEngine;
use crate::input::{client_rect, parse_card_id, CARD_ID_ATTRIBUTE};
use crate::preview::{html_div, PreviewOverlay};

pub(crate) type HoldHandler = Rc<dyn Fn(SessionId)>;

const HOVERED: &str = "hovered";
const DRAGGING: &str = "dragging";
const DROP_ELIGIBLE: &str = "drop-eligible";
const FIELD_FULL: &str = "field-full";
const FLAT_MODE: &str = "flat-mode";
const FLOATING_PROPERTIES: [&str; 6] = ["position", "left", "top", "width", "height", "margin"];

#[derive(Clone)]
pub(crate) struct Mounts {
    pub hand: HtmlElement,
    pub table: HtmlElement,
    pub controls: HtmlElement,
}

struct CardNodes {
    root: HtmlElement,
    surface: HtmlElement,
    _listeners: Vec<EventListener>,
}

pub(crate) struct DomHost {
    document: Document,
    mounts: Mounts,
    effect: EffectConfig,
    cards: HashMap<CardId, CardNodes>,
    placeholder: Option<(HtmlElement, Placeholder)>,
    drag_slots: Option<Vec<(CardId, Rect)>>,
    preview: PreviewOverlay,
    hold: Option<(SessionId, Timeout)>,
    on_hold: Option<HoldHandler>,
}

impl DomHost {
    pub(crate) fn new(
        document: &Document,
        mounts: Mounts,
        effect: EffectConfig,
    ) -> Result<Self, JsValue> {
        Ok(Self {
            preview: PreviewOverlay::new(document)?,
            document: document.clone(),
            mounts,
            effect,
            cards: HashMap::new(),
            placeholder: None,
            drag_slots: None,
            hold: None,
            on_hold: None,
        })
    }

    pub(crate) fn set_hold_handler(&mut self, handler: HoldHandler) {
        self.on_hold = Some(handler);
    }

    pub(crate) fn mounts(&self) -> &Mounts {
        &self.mounts
    }

    pub(crate) fn preview(&self) -> &PreviewOverlay {
        &self.preview
    }

    pub(crate) fn prune_cards(&mut self, count: usize) {
        self.cards.retain(|id, nodes| {
            let keep = (id.0 as usize) < count;
            if !keep {
                nodes.root.remove();
            }
            keep
        });
    }

    // Hand slots are frozen from lift until settle.
    pub(crate) fn surfaces(&self, hand: &[CardId]) -> Surfaces {
        let hand_slots = match &self.drag_slots {
            Some(slots) => slots.clone(),
            None => hand
                .iter()
                .filter_map(|id| {
                    self.cards
                        .get(id)
                        .map(|nodes| (*id, client_rect(&nodes.root)))
                })
                .collect(),
        };
        Surfaces {
            table: client_rect(&self.mounts.table),
            hand: client_rect(&self.mounts.hand),
            hand_slots,
        }
    }

    fn measure_hand_slots(&self, skip: CardId) -> Vec<(CardId, Rect)> {
        let children = self.mounts.hand.children();
        (0..children.length())
            .filter_map(|index| children.item(index))
            .filter_map(|child| {
                let id = parse_card_id(&child.get_attribute(CARD_ID_ATTRIBUTE)?)?;
                (id != skip).then(|| (id, client_rect(&child)))
            })
            .collect()
    }

    fn ensure_card(&mut self, card: CardId) -> Option<&CardNodes> {
        if !self.cards.contains_key(&card) {
            match build_card(&self.document, card) {
                Ok(nodes) => {
                    self.cards.insert(card, nodes);
                }
                Err(err) => {
                    console::warn!("failed to build card element", card.to_string(), err);
                    return None;
                }
            }
        }
        self.cards.get(&card)
    }

    fn set_table_hover(&self, hover: DropHover) {
        let classes = self.mounts.table.class_list();
        let _ = classes.toggle_with_force(DROP_ELIGIBLE, hover == DropHover::Eligible);
        let _ = classes.toggle_with_force(FIELD_FULL, hover == DropHover::Full);
    }

    fn move_placeholder(&mut self, placeholder: Placeholder) {
        let Some((element, current)) = self.placeholder.as_mut() else {
            return;
        };
        if *current == placeholder {
            return;
        }
        *current = placeholder;
        let element: &HtmlElement = element;
        let next = placeholder
            .before
            .and_then(|id| self.cards.get(&id))
            .map(|nodes| nodes.root.clone());
        match next {
            Some(next) => {
                let _ = self.mounts.hand.insert_before(element, Some(&next));
            }
            None => {
                let _ = self.mounts.hand.append_child(element);
            }
        }
    }
}

impl MountHost for DomHost {
    type Engine = EffectEngine;

    fn unmount(&mut self, _card: CardId, engine: EffectEngine) {
        engine.destroy();
    }

    fn place(&mut self, card: CardId, zone: Zone, before: Option<CardId>) {
        let parent = match zone {
            Zone::Hand => self.mounts.hand.clone(),
            Zone::Table => self.mounts.table.clone(),
            Zone::Dragging | Zone::PreviewOnly => return,
        };
        let Some(root) = self.ensure_card(card).map(|nodes| nodes.root.clone()) else {
            return;
        };
        let next = before
            .and_then(|id| self.cards.get(&id))
            .map(|nodes| nodes.root.clone());
        match next {
            Some(next) => {
                let _ = parent.insert_before(&root, Some(&next));
            }
            None => {
                let _ = parent.append_child(&root);
            }
        }
    }

    fn mount(&mut self, card: CardId, zone: Zone) -> Option<EffectEngine> {
        let target = match zone {
            Zone::PreviewOnly => self.preview.surface().clone(),
            Zone::Hand | Zone::Table => self.cards.get(&card)?.surface.clone(),
            Zone::Dragging => return None,
        };
        match EffectEngine::attach(&target, self.effect.clone()) {
            Ok(engine) => Some(engine),
            Err(err) => {
                console::warn!("effect engine not attached", card.to_string(), err.to_string());
                None
            }
        }
    }
}

impl HandHost for DomHost {
    fn arm_hold(&mut self, session: SessionId, delay_ms: u32) {
        let Some(handler) = self.on_hold.clone() else {
            return;
        };
        let timer = Timeout::new(delay_ms, move || handler(session));
        self.hold = Some((session, timer));
    }

    fn cancel_hold(&mut self, session: SessionId) {
        if matches!(self.hold, Some((armed, _)) if armed == session) {
            self.hold = None;
        }
    }

    fn lift(&mut self, card: CardId, placeholder: Placeholder) {
        let Some(nodes) = self.cards.get(&card) else {
            return;
        };
        let root = nodes.root.clone();
        let rect = client_rect(&root);
        if let Ok(element) = html_div(&self.document, "card-placeholder") {
            let style = element.style();
            let _ = style.set_property("width", &format!("{}px", rect.width));
            let _ = style.set_property("height", &format!("{}px", rect.height));
            let _ = self.mounts.hand.insert_before(&element, Some(&root));
            self.placeholder = Some((element, placeholder));
        }
        let classes = root.class_list();
        let _ = classes.remove_1(HOVERED);
        let _ = classes.add_1(DRAGGING);
        let style = root.style();
        let _ = style.set_property("position", "fixed");
        let _ = style.set_property("margin", "0");
        let _ = style.set_property("left", &format!("{}px", rect.left));
        let _ = style.set_property("top", &format!("{}px", rect.top));
        let _ = style.set_property("width", &format!("{}px", rect.width));
        let _ = style.set_property("height", &format!("{}px", rect.height));
        self.drag_slots = Some(self.measure_hand_slots(card));
    }

    fn follow(&mut self, card: CardId, top_left: Point, hover: DropHover, placeholder: Placeholder) {
        if let Some(nodes) = self.cards.get(&card) {
            let style = nodes.root.style();
            let _ = style.set_property("left", &format!("{}px", top_left.x));
            let _ = style.set_property("top", &format!("{}px", top_left.y));
        }
        self.set_table_hover(hover);
        self.move_placeholder(placeholder);
    }

    fn settle(&mut self, card: CardId) {
        if let Some((element, _)) = self.placeholder.take() {
            element.remove();
        }
        self.drag_slots = None;
        self.set_table_hover(DropHover::None);
        let Some(nodes) = self.cards.get(&card) else {
            return;
        };
        let _ = nodes.root.class_list().remove_2(DRAGGING, HOVERED);
        let style = nodes.root.style();
        for property in FLOATING_PROPERTIES {
            let _ = style.remove_property(property);
        }
    }

    fn apply_slots(&mut self, slots: &[(CardId, SlotPosition)]) {
        for (card, slot) in slots {
            let Some(nodes) = self.cards.get(card) else {
                continue;
            };
            let style = nodes.root.style();
            let _ = style.set_property("--index-in-zone", &slot.index.to_string());
            let _ = style.set_property("--zone-size", &slot.total.to_string());
        }
    }

    fn apply_layout(&mut self, mode: LayoutMode) {
        let _ = self
            .mounts
            .hand
            .class_list()
            .toggle_with_force(FLAT_MODE, mode.is_flat());
    }

    fn show_preview(&mut self, card: Option<CardId>) {
        match card {
            Some(card) => {
                console::log!("preview open", card.to_string());
                self.preview.show(card);
            }
            None => {
                console::log!("preview closed");
                self.preview.hide();
            }
        }
    }

    fn rejected(&mut self, card: CardId, error: &RegistryError) {
        console::warn!("card move rejected", card.to_string(), error.to_string());
    }
}

pub(crate) fn card_label(card: CardId) -> String {
    format!("Card {}", card.0 + 1)
}

pub(crate) fn card_hue(card: CardId) -> u32 {
    (card.0 * 47) % 360
}

fn build_card(document: &Document, card: CardId) -> Result<CardNodes, JsValue> {
    let root = html_div(document, "card")?;
    root.set_attribute(CARD_ID_ATTRIBUTE, &card.0.to_string())?;
    let _ = root
        .style()
        .set_property("--card-hue", &card_hue(card).to_string());
    let surface = html_div(document, "card-surface")?;
    let label = document.create_element("span")?;
    label.set_class_name("card-label");
    label.set_text_content(Some(&card_label(card)));
    surface.append_child(&label)?;
    root.append_child(&surface)?;

    let enter_target = root.clone();
    let enter = EventListener::new(&root, "pointerenter", move |_| {
        let classes = enter_target.class_list();
        if !classes.contains(DRAGGING) {
            let _ = classes.add_1(HOVERED);
        }
    });
    let leave_target = root.clone();
    let leave = EventListener::new(&root, "pointerleave", move |_| {
        let _ = leave_target.class_list().remove_1(HOVERED);
    });
    Ok(CardNodes {
        root,
        surface,
        _listeners: vec![enter, leave],
    })
}
