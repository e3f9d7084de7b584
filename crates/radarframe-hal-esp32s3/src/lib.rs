#![no_std]

//! ESP32-S3 board glue for the rain-radar frame: display painting,
//! battery sampling, and the flash-backed network preference.

pub mod platform;
pub mod storage;
