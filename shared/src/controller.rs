use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::city::CityRecord;
use crate::surface::{DisplaySurface, SubscriptionHandle};
use crate::viewport::{SizeOverrides, Viewport, ViewportUpdate};

type ChangeListener = Rc<dyn Fn(&Viewport)>;

/// Owns the map [`Viewport`] and keeps its size in step with a [`DisplaySurface`].
///
/// `start()` subscribes to resize notifications and immediately re-reads the
/// surface size; `stop()` unsubscribes. Both are idempotent. Once `stop()` has
/// returned, no resize notification can change the viewport, even one the
/// surface had already queued. Dropping a running controller stops it.
pub struct ViewportController<S: DisplaySurface + 'static> {
    inner: Rc<Inner<S>>,
}

struct Inner<S> {
    surface: S,
    overrides: SizeOverrides,
    viewport: Cell<Viewport>,
    active: Cell<bool>,
    subscription: Cell<Option<SubscriptionHandle>>,
    listener: RefCell<Option<ChangeListener>>,
}

impl<S: DisplaySurface + 'static> ViewportController<S> {
    pub fn new(surface: S, city: &CityRecord, overrides: SizeOverrides) -> Self {
        let (width, height) = overrides.apply(surface.current_width(), surface.current_height());
        let inner = Rc::new(Inner {
            surface,
            overrides,
            viewport: Cell::new(Viewport::for_city(city, width, height)),
            active: Cell::new(false),
            subscription: Cell::new(None),
            listener: RefCell::new(None),
        });
        Self { inner }
    }

    /// Current viewport.
    pub fn viewport(&self) -> Viewport {
        self.inner.viewport.get()
    }

    pub fn overrides(&self) -> SizeOverrides {
        self.inner.overrides
    }

    pub fn is_running(&self) -> bool {
        self.inner.active.get()
    }

    /// Merge `partial` into the viewport and return the result.
    pub fn update(&self, partial: &ViewportUpdate) -> Viewport {
        self.inner.update(partial)
    }

    /// Re-read the surface size (overrides win) and merge it in.
    pub fn on_resize(&self) -> Viewport {
        self.inner.resize()
    }

    /// Register the observer called after every completed update or resize.
    /// Replaces any previous observer.
    pub fn on_change(&self, listener: impl Fn(&Viewport) + 'static) {
        *self.inner.listener.borrow_mut() = Some(Rc::new(listener));
    }

    pub fn start(&self) {
        if self.inner.active.replace(true) {
            return;
        }

        let weak: Weak<Inner<S>> = Rc::downgrade(&self.inner);
        let handle = self.inner.surface.subscribe_resize(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.active.get() {
                inner.resize();
            }
        }));
        self.inner.subscription.set(Some(handle));
        tracing::debug!(subscription = handle.id(), "viewport controller started");

        // The surface may have changed size since construction.
        self.inner.resize();
    }

    pub fn stop(&self) {
        if !self.inner.active.replace(false) {
            return;
        }
        if let Some(handle) = self.inner.subscription.take() {
            self.inner.surface.unsubscribe(handle);
            tracing::debug!(subscription = handle.id(), "viewport controller stopped");
        }
    }
}

impl<S: DisplaySurface + 'static> Drop for ViewportController<S> {
    fn drop(&mut self) {
        self.stop();
        // Break a listener -> controller reference cycle on teardown.
        self.inner.listener.borrow_mut().take();
    }
}

impl<S: DisplaySurface + std::fmt::Debug + 'static> std::fmt::Debug for ViewportController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportController")
            .field("surface", &self.inner.surface)
            .field("viewport", &self.inner.viewport.get())
            .field("overrides", &self.inner.overrides)
            .field("running", &self.inner.active.get())
            .finish()
    }
}

impl<S: DisplaySurface> Inner<S> {
    fn update(&self, partial: &ViewportUpdate) -> Viewport {
        let next = self.viewport.get().merged(partial);
        self.viewport.set(next);

        // Clone out so the observer may call back into the controller.
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(&next);
        }
        next
    }

    fn resize(&self) -> Viewport {
        let (width, height) = self
            .overrides
            .apply(self.surface.current_width(), self.surface.current_height());
        tracing::trace!(width, height, "viewport resize");
        self.update(&ViewportUpdate::size(width, height))
    }
}
