use std::cell::{Cell, RefCell};
use std::rc::Rc;

use citymap_shared::{DisplaySurface, ResizeCallback, SubscriptionHandle};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Browser window as a [`DisplaySurface`]: `innerWidth`/`innerHeight` plus the `resize` event.
///
/// Without a window (worker, tests) the size is 0 x 0 and subscriptions never fire.
#[derive(Clone)]
pub struct WindowSurface {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    next_id: Cell<u64>,
    bindings: RefCell<Vec<ResizeBinding>>,
}

struct ResizeBinding {
    handle: SubscriptionHandle,
    callback: Closure<dyn Fn()>,
}

impl WindowSurface {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                window: web_sys::window(),
                next_id: Cell::new(0),
                bindings: RefCell::new(Vec::new()),
            }),
        }
    }

    fn next_handle(&self) -> SubscriptionHandle {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        SubscriptionHandle::new(id)
    }
}

impl Default for WindowSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySurface for WindowSurface {
    fn current_width(&self) -> f64 {
        self.inner
            .window
            .as_ref()
            .and_then(|w| w.inner_width().ok())
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn current_height(&self) -> f64 {
        self.inner
            .window
            .as_ref()
            .and_then(|w| w.inner_height().ok())
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn subscribe_resize(&self, callback: ResizeCallback) -> SubscriptionHandle {
        let handle = self.next_handle();
        let Some(window) = self.inner.window.as_ref() else {
            return handle;
        };

        let closure = Closure::<dyn Fn()>::new(move || callback());
        match window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref()) {
            Ok(()) => self.inner.bindings.borrow_mut().push(ResizeBinding {
                handle,
                callback: closure,
            }),
            Err(_) => {
                web_sys::console::warn_1(&"Failed to subscribe to window resize".into());
            }
        }
        handle
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        let removed = {
            let mut bindings = self.inner.bindings.borrow_mut();
            let Some(pos) = bindings.iter().position(|b| b.handle == handle) else {
                return;
            };
            bindings.remove(pos)
        };
        if let Some(window) = self.inner.window.as_ref() {
            let _ = window.remove_event_listener_with_callback(
                "resize",
                removed.callback.as_ref().unchecked_ref(),
            );
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        for binding in self.bindings.borrow_mut().drain(..) {
            let _ = window.remove_event_listener_with_callback(
                "resize",
                binding.callback.as_ref().unchecked_ref(),
            );
        }
    }
}
