//! Application-level configuration.
//!
//! - [`DeliveryParams`]: transport selection, pacing and history knobs

pub mod delivery_params;

pub use delivery_params::DeliveryParams;
