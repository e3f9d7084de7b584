#![cfg_attr(not(test), no_std)]

//! Hardware-independent logic for the rain-radar frame firmware.
//!
//! Everything in this crate is pure and host-testable: candidate
//! rotation for Wi-Fi failover, the bounded image write cursor, server
//! date parsing, the wake-schedule policy, and the per-cycle outcome
//! bookkeeping. Board glue lives in `radarframe-hal-esp32s3` and the
//! binary crate.

pub mod clock;
pub mod cursor;
pub mod cycle;
pub mod error;
pub mod indicator;
pub mod net;
pub mod prefs;
pub mod schedule;
