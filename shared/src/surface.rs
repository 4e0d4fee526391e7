use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Callback fired by a display surface whenever its size changes.
pub type ResizeCallback = Box<dyn Fn()>;

/// Opaque token returned by [`DisplaySurface::subscribe_resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// The ambient surface a map is drawn into (usually the browser window).
///
/// Sizes are in CSS pixels. A surface that cannot report its size returns 0.
/// Notifications are delivered on the caller's thread, one at a time.
pub trait DisplaySurface {
    fn current_width(&self) -> f64;
    fn current_height(&self) -> f64;
    fn subscribe_resize(&self, callback: ResizeCallback) -> SubscriptionHandle;
    fn unsubscribe(&self, handle: SubscriptionHandle);
}

/// Fixed-size surface that never resizes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StaticSurface {
    pub width: f64,
    pub height: f64,
}

impl StaticSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Stand-in for environments with no display (0 x 0).
    pub fn unavailable() -> Self {
        Self::default()
    }
}

impl DisplaySurface for StaticSurface {
    fn current_width(&self) -> f64 {
        self.width
    }

    fn current_height(&self) -> f64 {
        self.height
    }

    fn subscribe_resize(&self, _callback: ResizeCallback) -> SubscriptionHandle {
        SubscriptionHandle(0)
    }

    fn unsubscribe(&self, _handle: SubscriptionHandle) {}
}

/// In-memory surface resized by hand. Clones share the same state.
#[derive(Clone, Default)]
pub struct ManualSurface {
    inner: Rc<ManualInner>,
}

#[derive(Default)]
struct ManualInner {
    width: Cell<f64>,
    height: Cell<f64>,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(SubscriptionHandle, Rc<dyn Fn()>)>>,
}

impl ManualSurface {
    pub fn new(width: f64, height: f64) -> Self {
        let surface = Self::default();
        surface.inner.width.set(width);
        surface.inner.height.set(height);
        surface
    }

    /// Change the size without notifying anyone.
    pub fn set_size(&self, width: f64, height: f64) {
        self.inner.width.set(width);
        self.inner.height.set(height);
    }

    /// Change the size and notify every current subscriber.
    pub fn resize_to(&self, width: f64, height: f64) {
        self.set_size(width, height);
        self.queue_notification().deliver();
    }

    /// Capture the subscribers a notification would go to right now, without running them.
    /// Models a resize event that is already queued on the event loop.
    pub fn queue_notification(&self) -> QueuedNotification {
        let callbacks = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        QueuedNotification { callbacks }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl std::fmt::Debug for ManualSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualSurface")
            .field("width", &self.inner.width.get())
            .field("height", &self.inner.height.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl DisplaySurface for ManualSurface {
    fn current_width(&self) -> f64 {
        self.inner.width.get()
    }

    fn current_height(&self) -> f64 {
        self.inner.height.get()
    }

    fn subscribe_resize(&self, callback: ResizeCallback) -> SubscriptionHandle {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        let handle = SubscriptionHandle(id);
        self.inner
            .listeners
            .borrow_mut()
            .push((handle, Rc::from(callback)));
        handle
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(h, _)| *h != handle);
    }
}

/// A resize notification captured before delivery.
pub struct QueuedNotification {
    callbacks: Vec<Rc<dyn Fn()>>,
}

impl QueuedNotification {
    pub fn deliver(self) {
        for callback in self.callbacks {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_surface_reports_zero_size() {
        let surface = StaticSurface::unavailable();
        assert_eq!(surface.current_width(), 0.0);
        assert_eq!(surface.current_height(), 0.0);
    }

    #[test]
    fn manual_surface_notifies_until_unsubscribed() {
        let surface = ManualSurface::new(100.0, 50.0);
        let hits = Rc::new(Cell::new(0));
        let hits_cb = Rc::clone(&hits);
        let handle = surface.subscribe_resize(Box::new(move || hits_cb.set(hits_cb.get() + 1)));

        surface.resize_to(200.0, 100.0);
        assert_eq!(hits.get(), 1);
        assert_eq!(surface.current_width(), 200.0);

        surface.unsubscribe(handle);
        assert_eq!(surface.subscriber_count(), 0);
        surface.resize_to(300.0, 150.0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn handles_are_distinct() {
        let surface = ManualSurface::default();
        let a = surface.subscribe_resize(Box::new(|| {}));
        let b = surface.subscribe_resize(Box::new(|| {}));
        assert_ne!(a, b);
        surface.unsubscribe(a);
        assert_eq!(surface.subscriber_count(), 1);
    }
}
