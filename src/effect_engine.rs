use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use js_sys::{Function, Reflect};
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement};

use cardhand_core::{
    render_frame, Channel, EffectConfig, EffectConfigPatch, EffectState, FrameGate, Point,
};

use crate::input::{client_rect, first_touch_point, PointerSample};

#[derive(Debug, Error)]
pub(crate) enum EffectError {
    #[error("effect target is not an HTML element")]
    NotMountable,
}

pub(crate) struct EffectEngine {
    inner: Rc<EffectInner>,
}

struct EffectInner {
    element: HtmlElement,
    config: RefCell<EffectConfig>,
    state: RefCell<EffectState>,
    gate: RefCell<FrameGate>,
    frame: RefCell<Option<AnimationFrame>>,
    layers: RefCell<Vec<(Channel, HtmlElement)>>,
    listeners: RefCell<Vec<EventListener>>,
    reduced_motion: bool,
}

impl EffectEngine {
    pub(crate) fn attach(element: &Element, config: EffectConfig) -> Result<Self, EffectError> {
        let element = element
            .dyn_ref::<HtmlElement>()
            .cloned()
            .ok_or(EffectError::NotMountable)?;
        let inner = Rc::new(EffectInner {
            element,
            config: RefCell::new(config),
            state: RefCell::new(EffectState::default()),
            gate: RefCell::new(FrameGate::default()),
            frame: RefCell::new(None),
            layers: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            reduced_motion: prefers_reduced_motion(),
        });
        inner.build_layers();
        if inner.reduced_motion {
            inner.render();
        } else {
            inner.install_listeners();
            inner.schedule();
        }
        Ok(Self { inner })
    }

    pub(crate) fn update(&self, patch: &EffectConfigPatch) {
        let inner = &self.inner;
        let (channels_changed, tilt) = {
            let mut config = inner.config.borrow_mut();
            let before = config.enabled_channels();
            config.apply(patch);
            (before != config.enabled_channels(), config.tilt)
        };
        if channels_changed {
            inner.remove_layers();
            inner.build_layers();
        }
        if !tilt {
            let _ = inner.element.style().remove_property("transform");
        }
        if inner.reduced_motion {
            inner.render();
        } else {
            inner.schedule();
        }
    }

    pub(crate) fn destroy(self) {
        drop(self);
    }
}

impl Drop for EffectEngine {
    fn drop(&mut self) {
        self.inner.teardown();
    }
}

impl EffectInner {
    fn build_layers(&self) {
        let Some(document) = self.element.owner_document() else {
            return;
        };
        let channels = self.config.borrow().enabled_channels();
        let mut layers = self.layers.borrow_mut();
        for channel in channels {
            let Ok(layer) = document.create_element("div") else {
                continue;
            };
            let Ok(layer) = layer.dyn_into::<HtmlElement>() else {
                continue;
            };
            layer.set_class_name(channel.class_name());
            let _ = layer.set_attribute("aria-hidden", "true");
            let _ = self.element.append_child(&layer);
            layers.push((channel, layer));
        }
    }

    fn remove_layers(&self) {
        for (_, layer) in self.layers.borrow_mut().drain(..) {
            layer.remove();
        }
    }

    fn install_listeners(self: &Rc<Self>) {
        let target = self.element.clone();
        let mut listeners = self.listeners.borrow_mut();

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&target, "pointerenter", move |_| {
            with_inner(&weak, |inner| inner.engage());
        }));
        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&target, "pointermove", move |event| {
            let Some(sample) = PointerSample::from_event(event) else {
                return;
            };
            with_inner(&weak, |inner| inner.track(sample.point));
        }));
        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&target, "pointerleave", move |_| {
            with_inner(&weak, |inner| inner.release());
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&target, "touchstart", move |event| {
            with_inner(&weak, |inner| {
                inner.engage();
                inner.track_touch(event);
            });
        }));
        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&target, "touchmove", move |event| {
            with_inner(&weak, |inner| inner.track_touch(event));
        }));
        for kind in ["touchend", "touchcancel"] {
            let weak = Rc::downgrade(self);
            listeners.push(EventListener::new(&target, kind, move |_| {
                with_inner(&weak, |inner| inner.release());
            }));
        }
    }

    fn engage(self: &Rc<Self>) {
        let transition = self.config.borrow().transition_in.clone();
        let _ = self.element.style().set_property("transition", &transition);
        self.state.borrow_mut().enter();
        self.schedule();
    }

    fn track(self: &Rc<Self>, point: Point) {
        let bounds = client_rect(&self.element);
        let max_rotation = self.config.borrow().max_rotation;
        if self.state.borrow_mut().track(bounds, point, max_rotation) {
            self.schedule();
        }
    }

    fn track_touch(self: &Rc<Self>, event: &Event) {
        if let Some(point) = first_touch_point(event) {
            self.track(point);
        }
    }

    fn release(self: &Rc<Self>) {
        let transition = self.config.borrow().transition_out.clone();
        let _ = self.element.style().set_property("transition", &transition);
        self.state.borrow_mut().leave();
        self.schedule();
    }

    fn schedule(self: &Rc<Self>) {
        if !self.gate.borrow_mut().invalidate() {
            return;
        }
        let weak = Rc::downgrade(self);
        let handle = request_animation_frame(move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.frame.borrow_mut().take();
            let dirty = inner.gate.borrow_mut().take_frame();
            if dirty {
                inner.render();
            }
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn render(&self) {
        let frame = render_frame(
            &self.state.borrow(),
            &self.config.borrow(),
            self.reduced_motion,
        );
        if let Some(transform) = frame.transform {
            let _ = self.element.style().set_property("transform", &transform);
        }
        let layers = self.layers.borrow();
        for style in &frame.layers {
            let Some((_, layer)) = layers.iter().find(|(channel, _)| *channel == style.channel)
            else {
                continue;
            };
            let css = layer.style();
            let _ = css.set_property("background", &style.background);
            let _ = css.set_property("opacity", &format!("{:.2}", style.opacity));
        }
    }

    fn teardown(&self) {
        self.listeners.borrow_mut().clear();
        self.gate.borrow_mut().cancel();
        self.frame.borrow_mut().take();
        self.remove_layers();
        let style = self.element.style();
        let _ = style.remove_property("transform");
        let _ = style.remove_property("transition");
    }
}

fn with_inner<F>(weak: &Weak<EffectInner>, action: F)
where
    F: FnOnce(&Rc<EffectInner>),
{
    if let Some(inner) = weak.upgrade() {
        action(&inner);
    }
}

fn prefers_reduced_motion() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let Ok(match_media) = Reflect::get(&window, &"matchMedia".into()) else {
        return false;
    };
    let Ok(match_media) = match_media.dyn_into::<Function>() else {
        return false;
    };
    let Ok(query) = match_media.call1(&window, &"(prefers-reduced-motion: reduce)".into()) else {
        return false;
    };
    Reflect::get(&query, &"matches".into())
        .ok()
        .and_then(|value| value.as_bool())
        .unwrap_or(false)
}
