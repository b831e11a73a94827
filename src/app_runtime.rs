use std::cell::RefCell;
use std::rc::Rc;

use crate::app_core::HandApp;

thread_local! {
    static APP: RefCell<Option<Rc<HandApp>>> = RefCell::new(None);
}

pub(crate) fn set_app(app: Rc<HandApp>) {
    APP.with(|slot| {
        *slot.borrow_mut() = Some(app);
    });
}

