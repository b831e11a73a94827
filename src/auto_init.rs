use std::cell::RefCell;

use gloo::console;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use cardhand_core::{EffectConfig, EffectConfigPatch};

use crate::effect_engine::EffectEngine;

const HOLO_SELECTOR: &str = "[data-holo]";

thread_local! {
    static STATIC_ENGINES: RefCell<Vec<EffectEngine>> = RefCell::new(Vec::new());
}

pub(crate) fn attach_declared(document: &Document, base: &EffectConfig) -> usize {
    let Ok(nodes) = document.query_selector_all(HOLO_SELECTOR) else {
        return 0;
    };
    let mut engines = Vec::new();
    for index in 0..nodes.length() {
        let Some(element) = nodes
            .item(index)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        let patch = match EffectConfigPatch::from_attributes(|name| element.get_attribute(name)) {
            Ok(patch) => patch,
            Err(err) => {
                console::warn!("data-holo config ignored", element.id(), err.to_string());
                EffectConfigPatch::default()
            }
        };
        match EffectEngine::attach(&element, base.clone().with_patch(&patch)) {
            Ok(engine) => engines.push(engine),
            Err(err) => console::warn!("data-holo element skipped", element.id(), err.to_string()),
        }
    }
    let count = engines.len();
    STATIC_ENGINES.with(|slot| slot.borrow_mut().extend(engines));
    count
}
