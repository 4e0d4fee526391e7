pub mod city;
pub mod controller;
pub mod query;
pub mod surface;
pub mod viewport;

pub use city::*;
pub use controller::ViewportController;
pub use surface::{
    DisplaySurface, ManualSurface, QueuedNotification, ResizeCallback, StaticSurface,
    SubscriptionHandle,
};
pub use viewport::*;
