//! Per-cycle bookkeeping for the boot orchestrator.
//!
//! The orchestrator itself lives in the binary crate and runs one
//! linear pass per boot; the pure decisions it makes along the way are
//! kept here so they can be tested on the host.

use crate::error::ErrorKind;

/// Steps of the single forward pass per boot, in order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CycleStage {
    RestoreConfig,
    ConnectNetwork,
    FetchInfo,
    FetchImage,
    DrawOverlays,
    ComputeSchedule,
    TeardownNetwork,
    Present,
    Sleep,
}

/// A failed step plus its cause, carried to the error banner.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CycleFailure {
    pub stage: CycleStage,
    pub kind: ErrorKind,
}

impl CycleFailure {
    pub const fn new(stage: CycleStage, kind: ErrorKind) -> Self {
        Self { stage, kind }
    }

    /// On-screen message for the failed stage.
    pub fn message(&self) -> &'static str {
        match self.stage {
            CycleStage::RestoreConfig => "Config restore failed",
            CycleStage::ConnectNetwork => "WiFi connect failed",
            CycleStage::FetchInfo => "Image info fetch failed",
            CycleStage::FetchImage => "Image fetch failed",
            CycleStage::DrawOverlays => "Overlay draw failed",
            CycleStage::ComputeSchedule => "Schedule failed",
            CycleStage::TeardownNetwork => "Network teardown failed",
            CycleStage::Present => "Display update failed",
            CycleStage::Sleep => "Sleep entry failed",
        }
    }
}

/// Decides whether the connected network should be persisted as the new
/// preference: only when it differs from the restored hint.
pub fn preference_update(hint: u8, connected: u8) -> Option<u8> {
    if connected != hint {
        Some(connected)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_is_persisted_only_when_it_changes() {
        assert_eq!(preference_update(1, 2), Some(2));
        assert_eq!(preference_update(0, 1), Some(1));
        assert_eq!(preference_update(2, 2), None);
        assert_eq!(preference_update(0, 0), None);
    }

    #[test]
    fn failure_messages_name_the_stage() {
        let failure = CycleFailure::new(CycleStage::ConnectNetwork, ErrorKind::Timeout);
        assert_eq!(failure.message(), "WiFi connect failed");
        assert_eq!(failure.kind, ErrorKind::Timeout);

        let failure = CycleFailure::new(CycleStage::FetchImage, ErrorKind::NotFound);
        assert_eq!(failure.message(), "Image fetch failed");
    }
}
