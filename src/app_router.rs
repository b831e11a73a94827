use gloo::console;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, UrlSearchParams};

use cardhand_core::{EffectConfig, EffectConfigPatch, HandConfig, HAND_CONFIG_ATTRIBUTE};

use crate::dom_host::Mounts;
use crate::preview::html_div;

pub(crate) const HAND_ID: &str = "hand";
pub(crate) const TABLE_ID: &str = "table";
pub(crate) const CONTROLS_ID: &str = "controls";

#[derive(Clone, Debug)]
pub(crate) struct InitConfig {
    pub(crate) hand: HandConfig,
    pub(crate) effect: EffectConfig,
}

pub(crate) fn load_init_config(document: &Document) -> InitConfig {
    let root = document.get_element_by_id(HAND_ID);
    let mut hand = root
        .as_ref()
        .and_then(|root| root.get_attribute(HAND_CONFIG_ATTRIBUTE))
        .and_then(|raw| match HandConfig::from_json(&raw) {
            Ok(config) => Some(config),
            Err(err) => {
                console::warn!("ignoring hand config", err.to_string());
                None
            }
        })
        .unwrap_or_default();
    if let Some(params) = query_params() {
        if let Err(err) = hand.apply_query(|name| params.get(name)) {
            console::warn!("ignoring query string", err.to_string());
        }
    }

    let mut effect = EffectConfig::default();
    if let Some(root) = root.as_ref() {
        match EffectConfigPatch::from_attributes(|name| root.get_attribute(name)) {
            Ok(patch) => effect.apply(&patch),
            Err(err) => console::warn!("ignoring effect config", err.to_string()),
        }
    }
    console::log!(
        "hand config",
        hand.card_count as u32,
        hand.table_capacity as u32,
        format!("{:?}", hand.initial_layout)
    );
    InitConfig { hand, effect }
}

fn query_params() -> Option<UrlSearchParams> {
    let search = web_sys::window()?.location().search().ok()?;
    UrlSearchParams::new_with_str(&search).ok()
}

pub(crate) fn resolve_mounts(document: &Document) -> Option<Mounts> {
    Some(Mounts {
        hand: ensure_mount(document, HAND_ID)?,
        table: ensure_mount(document, TABLE_ID)?,
        controls: ensure_mount(document, CONTROLS_ID)?,
    })
}

fn ensure_mount(document: &Document, id: &str) -> Option<HtmlElement> {
    if let Some(existing) = document.get_element_by_id(id) {
        return existing.dyn_into::<HtmlElement>().ok();
    }
    let body = document.body()?;
    let element = html_div(document, id).ok()?;
    element.set_id(id);
    body.append_child(&element).ok()?;
    Some(element)
}
