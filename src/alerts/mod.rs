//! Post-processing for the hazard/police and speed-camera feeds.
//!
//! Both feeds are bounding-box queries around a single point, with different
//! box sizes. Results are filtered and formatted for display, never
//! persisted.

pub mod cameras;
pub mod police;

pub use cameras::SpeedCameras;
pub use police::PoliceAlerts;
