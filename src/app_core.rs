use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use wasm_bindgen::JsValue;
use web_sys::{Document, Event};

use cardhand_core::{
    CardId, EffectConfig, HandConfig, HandController, LayoutMode, SessionId, Surfaces,
};

use crate::dom_host::{DomHost, Mounts};
use crate::effect_engine::EffectEngine;
use crate::input::{card_from_event, client_rect, PointerSample};

pub(crate) type AppSubscriber = Rc<dyn Fn()>;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct HandSnapshot {
    pub(crate) layout: LayoutMode,
    pub(crate) hand_len: usize,
    pub(crate) table_len: usize,
    pub(crate) capacity: usize,
    pub(crate) preview: Option<CardId>,
}

pub(crate) struct HandApp {
    controller: RefCell<HandController<EffectEngine>>,
    host: RefCell<DomHost>,
    subscribers: Rc<RefCell<Vec<AppSubscriber>>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl HandApp {
    pub(crate) fn new(
        document: &Document,
        mounts: Mounts,
        config: HandConfig,
        effect: EffectConfig,
    ) -> Result<Rc<Self>, JsValue> {
        let host = DomHost::new(document, mounts, effect)?;
        let app = Rc::new_cyclic(|weak: &Weak<HandApp>| {
            let mut host = host;
            let weak = weak.clone();
            host.set_hold_handler(Rc::new(move |session| {
                if let Some(app) = weak.upgrade() {
                    app.hold_elapsed(session);
                }
            }));
            Self {
                controller: RefCell::new(HandController::new(config)),
                host: RefCell::new(host),
                subscribers: Rc::new(RefCell::new(Vec::new())),
                listeners: RefCell::new(Vec::new()),
            }
        });
        app.initialize();
        app.install_listeners();
        Ok(app)
    }

    pub(crate) fn subscribe(&self, subscriber: AppSubscriber) -> AppSubscription {
        self.subscribers.borrow_mut().push(subscriber.clone());
        AppSubscription {
            subscriber,
            subscribers: Rc::clone(&self.subscribers),
        }
    }

    fn notify(&self) {
        let subscribers = self.subscribers.borrow().clone();
        for subscriber in subscribers {
            (subscriber)();
        }
    }

    pub(crate) fn snapshot(&self) -> HandSnapshot {
        let controller = self.controller.borrow();
        let registry = controller.registry();
        HandSnapshot {
            layout: controller.layout(),
            hand_len: registry.hand().len(),
            table_len: registry.table().len(),
            capacity: registry.capacity(),
            preview: controller.preview().card(),
        }
    }

    pub(crate) fn initialize(&self) {
        {
            let mut host = self.host.borrow_mut();
            let mut controller = self.controller.borrow_mut();
            controller.initialize(&mut *host);
            host.prune_cards(controller.config().card_count);
        }
        self.notify();
    }

    pub(crate) fn toggle_layout(&self) -> LayoutMode {
        let mode = {
            let mut host = self.host.borrow_mut();
            self.controller.borrow_mut().toggle_layout(&mut *host)
        };
        self.notify();
        mode
    }

    pub(crate) fn reset_all(&self) -> usize {
        let moved = {
            let mut host = self.host.borrow_mut();
            self.controller.borrow_mut().reset_all(&mut *host)
        };
        if moved > 0 {
            self.notify();
        }
        moved
    }

    pub(crate) fn open_preview(&self, card: CardId) -> bool {
        let opened = {
            let mut host = self.host.borrow_mut();
            self.controller.borrow_mut().open_preview(card, &mut *host)
        };
        if opened {
            self.notify();
        }
        opened
    }

    pub(crate) fn close_preview(&self) -> bool {
        let closed = {
            let mut host = self.host.borrow_mut();
            self.controller.borrow_mut().close_preview(&mut *host)
        };
        if closed {
            self.notify();
        }
        closed
    }

    fn hold_elapsed(&self, session: SessionId) {
        {
            let mut host = self.host.borrow_mut();
            self.controller.borrow_mut().hold_elapsed(session, &mut *host);
        }
        self.notify();
    }

    fn gesture_idle(&self) -> bool {
        self.controller.borrow().gesture().is_idle()
    }

    fn measure(&self) -> Surfaces {
        let controller = self.controller.borrow();
        let host = self.host.borrow();
        host.surfaces(controller.registry().hand())
    }

    fn on_pointer_down(&self, event: &Event) {
        let Some(sample) = PointerSample::from_event(event) else {
            return;
        };
        if !sample.is_primary_press() {
            return;
        }
        let Some((card, element)) = card_from_event(event) else {
            return;
        };
        let rect = client_rect(&element);
        let started = {
            let mut host = self.host.borrow_mut();
            self.controller
                .borrow_mut()
                .pointer_down(sample.id, card, sample.point, rect, &mut *host)
        };
        if started {
            event.prevent_default();
        }
    }

    fn on_pointer_move(&self, event: &Event) {
        if self.gesture_idle() {
            return;
        }
        let Some(sample) = PointerSample::from_event(event) else {
            return;
        };
        let surfaces = self.measure();
        let mut host = self.host.borrow_mut();
        self.controller
            .borrow_mut()
            .pointer_move(sample.id, sample.point, &surfaces, &mut *host);
    }

    fn on_pointer_up(&self, event: &Event) {
        if self.gesture_idle() {
            return;
        }
        let Some(sample) = PointerSample::from_event(event) else {
            return;
        };
        let surfaces = self.measure();
        {
            let mut host = self.host.borrow_mut();
            self.controller
                .borrow_mut()
                .pointer_up(sample.id, sample.point, &surfaces, &mut *host);
        }
        self.notify();
    }

    fn on_pointer_cancel(&self, event: &Event) {
        if self.gesture_idle() {
            return;
        }
        let Some(sample) = PointerSample::from_event(event) else {
            return;
        };
        {
            let mut host = self.host.borrow_mut();
            self.controller
                .borrow_mut()
                .pointer_cancel(sample.id, &mut *host);
        }
        self.notify();
    }

    fn install_listeners(self: &Rc<Self>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let (hand, preview_root) = {
            let host = self.host.borrow();
            (host.mounts().hand.clone(), host.preview().root().clone())
        };
        let mut listeners = self.listeners.borrow_mut();

        let app = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &hand,
            "pointerdown",
            active_options(),
            move |event: &Event| {
                if let Some(app) = app.upgrade() {
                    app.on_pointer_down(event);
                }
            },
        ));

        let app = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &window,
            "pointermove",
            active_options(),
            move |event: &Event| {
                if let Some(app) = app.upgrade() {
                    app.on_pointer_move(event);
                }
            },
        ));

        let app = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &window,
            "pointerup",
            active_options(),
            move |event: &Event| {
                if let Some(app) = app.upgrade() {
                    app.on_pointer_up(event);
                }
            },
        ));

        let app = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &window,
            "pointercancel",
            active_options(),
            move |event: &Event| {
                if let Some(app) = app.upgrade() {
                    app.on_pointer_cancel(event);
                }
            },
        ));

        let app = Rc::downgrade(self);
        listeners.push(EventListener::new(&preview_root, "click", move |event: &Event| {
            let Some(app) = app.upgrade() else {
                return;
            };
            let close = app.host.borrow().preview().is_close_target(event);
            if close {
                app.close_preview();
            }
        }));
    }
}

fn active_options() -> EventListenerOptions {
    EventListenerOptions {
        phase: EventListenerPhase::Bubble,
        passive: false,
    }
}

pub(crate) struct AppSubscription {
    subscriber: AppSubscriber,
    subscribers: Rc<RefCell<Vec<AppSubscriber>>>,
}

impl Drop for AppSubscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|item| !Rc::ptr_eq(item, &self.subscriber));
    }
}
