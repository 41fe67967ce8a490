//! Integration test modules for ctlsurf
//!
//! - banking: bank paging, knob routing, extender offsets, modes
//! - feedback: what reaches the hardware and when
//! - lifecycle: construction, invalidation, shutdown

pub mod banking;
pub mod feedback;
pub mod lifecycle;
