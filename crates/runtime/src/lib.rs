pub mod controller;
pub mod event_bus;
pub mod surface;

pub use controller::*;
pub use event_bus::*;
pub use surface::*;
