mod app_core;
mod app_router;
mod app_runtime;
mod auto_init;
mod controls;
mod dom_host;
mod effect_engine;
mod input;
mod preview;

use gloo::console;

use crate::app_core::HandApp;
use crate::controls::{Controls, ControlsProps};

fn main() {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        console::warn!("cardhand: no document, nothing to mount");
        return;
    };
    let Some(mounts) = app_router::resolve_mounts(&document) else {
        console::warn!("cardhand: could not create hand, table or controls mounts");
        return;
    };
    let config = app_router::load_init_config(&document);
    let declared = auto_init::attach_declared(&document, &config.effect);
    if declared > 0 {
        console::log!("data-holo engines attached", declared as u32);
    }

    let controls_root = mounts.controls.clone();
    let app = match HandApp::new(&document, mounts, config.hand, config.effect) {
        Ok(app) => app,
        Err(err) => {
            console::warn!("cardhand: failed to start", err);
            return;
        }
    };
    app_runtime::set_app(app.clone());
    yew::Renderer::<Controls>::with_root_and_props(controls_root.into(), ControlsProps { app })
        .render();
}
