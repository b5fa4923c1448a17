//! Battery sensor drivers

pub mod battery_divider;

pub use battery_divider::BatteryDivider;
