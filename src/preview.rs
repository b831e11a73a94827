use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlElement};

use cardhand_core::CardId;

use crate::dom_host::{card_hue, card_label};

const ACTIVE_CLASS: &str = "overlay-active";

pub(crate) struct PreviewOverlay {
    root: HtmlElement,
    frame: HtmlElement,
    surface: HtmlElement,
    label: Element,
}

impl PreviewOverlay {
    pub(crate) fn new(document: &Document) -> Result<Self, JsValue> {
        let root = html_div(document, "preview-overlay")?;
        let _ = root.set_attribute("aria-hidden", "true");
        let frame = html_div(document, "preview-frame card")?;
        let surface = html_div(document, "card-surface preview-surface")?;
        let label = document.create_element("span")?;
        label.set_class_name("card-label");
        surface.append_child(&label)?;
        frame.append_child(&surface)?;
        root.append_child(&frame)?;
        if let Some(body) = document.body() {
            body.append_child(&root)?;
        }
        Ok(Self {
            root,
            frame,
            surface,
            label,
        })
    }

    pub(crate) fn root(&self) -> &HtmlElement {
        &self.root
    }

    pub(crate) fn surface(&self) -> &HtmlElement {
        &self.surface
    }

    pub(crate) fn is_open(&self) -> bool {
        self.root.class_list().contains(ACTIVE_CLASS)
    }

    pub(crate) fn show(&self, card: CardId) {
        self.label.set_text_content(Some(&card_label(card)));
        let _ = self
            .frame
            .style()
            .set_property("--card-hue", &card_hue(card).to_string());
        let _ = self.frame.set_attribute("data-preview-card", &card.0.to_string());
        let _ = self.root.class_list().add_1(ACTIVE_CLASS);
        let _ = self.root.set_attribute("aria-hidden", "false");
    }

    pub(crate) fn hide(&self) {
        let _ = self.root.class_list().remove_1(ACTIVE_CLASS);
        let _ = self.root.set_attribute("aria-hidden", "true");
        let _ = self.frame.remove_attribute("data-preview-card");
        self.label.set_text_content(None);
    }

    pub(crate) fn is_close_target(&self, event: &Event) -> bool {
        let Some(target) = event.target() else {
            return false;
        };
        let Some(target) = target.dyn_ref::<Element>() else {
            return false;
        };
        let root: &Element = &self.root;
        let frame: &Element = &self.frame;
        target == root || target == frame
    }
}

impl Drop for PreviewOverlay {
    fn drop(&mut self) {
        self.root.remove();
    }
}

pub(crate) fn html_div(document: &Document, class: &str) -> Result<HtmlElement, JsValue> {
    let element = document.create_element("div")?;
    element.set_class_name(class);
    element.dyn_into::<HtmlElement>().map_err(JsValue::from)
}
