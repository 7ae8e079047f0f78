pub mod dispatch;
pub mod wiring;
