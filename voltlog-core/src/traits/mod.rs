//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and the sensor drivers. Storage lives in `voltlog-hal`.

pub mod sensor;

pub use sensor::{BatteryMonitor, SensorError};
