use std::rc::Rc;

use yew::prelude::*;

use crate::app_core::HandApp;

#[derive(Properties)]
pub(crate) struct ControlsProps {
    pub(crate) app: Rc<HandApp>,
}

impl PartialEq for ControlsProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.app, &other.app)
    }
}

#[function_component(Controls)]
pub(crate) fn controls(props: &ControlsProps) -> Html {
    let app = props.app.clone();
    let snapshot = use_state(|| app.snapshot());

    {
        let app = app.clone();
        let snapshot = snapshot.clone();
        use_effect_with((), move |_| {
            let weak = Rc::downgrade(&app);
            let subscription = app.subscribe(Rc::new(move || {
                if let Some(app) = weak.upgrade() {
                    snapshot.set(app.snapshot());
                }
            }));
            move || drop(subscription)
        });
    }

    let on_toggle = {
        let app = app.clone();
        Callback::from(move |_: MouseEvent| {
            app.toggle_layout();
        })
    };
    let on_reset = {
        let app = app.clone();
        Callback::from(move |_: MouseEvent| {
            app.reset_all();
        })
    };

    let table_full = snapshot.table_len >= snapshot.capacity;
    let counter_class = classes!("table-counter", table_full.then_some("field-full"));
    html! {
        <div class="hand-controls">
            <button
                type="button"
                class="layout-toggle"
                aria-pressed={snapshot.layout.is_flat().to_string()}
                onclick={on_toggle}
            >
                { snapshot.layout.toggle_label() }
            </button>
            <button
                type="button"
                class="reset-table"
                disabled={snapshot.table_len == 0}
                onclick={on_reset}
            >
                { "Return cards to hand" }
            </button>
            <span class={counter_class}>
                { format!("table {}/{}", snapshot.table_len, snapshot.capacity) }
            </span>
        </div>
    }
}
