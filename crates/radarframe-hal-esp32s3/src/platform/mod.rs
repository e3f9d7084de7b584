pub mod battery;
pub mod display;
pub mod led;
