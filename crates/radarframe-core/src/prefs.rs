//! Persisted network preference record.
//!
//! One small struct lives in non-volatile storage: the index of the
//! network that last connected successfully. The record carries no
//! version or checksum; an erased or corrupt region simply decodes to
//! index 0.

/// Raw record length in flash.
pub const RECORD_LEN: usize = 4;

/// Preference restored at boot and rewritten only when the connected
/// network differs from it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PersistedPreference {
    pub preferred_network_index: u8,
}

impl PersistedPreference {
    pub const DEFAULT: Self = Self {
        preferred_network_index: 0,
    };

    /// Decodes a raw flash record.
    ///
    /// `network_count` bounds the stored index; anything out of range
    /// (including the 0xFF pattern of erased flash) falls back to the
    /// default.
    pub fn decode(record: &[u8], network_count: usize) -> Self {
        let index = match record.first() {
            Some(byte) if (*byte as usize) < network_count => *byte,
            _ => 0,
        };
        Self {
            preferred_network_index: index,
        }
    }

    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut record = [0u8; RECORD_LEN];
        record[0] = self.preferred_network_index;
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_index_round_trips() {
        let pref = PersistedPreference {
            preferred_network_index: 2,
        };
        let record = pref.encode();
        assert_eq!(PersistedPreference::decode(&record, 3), pref);
    }

    #[test]
    fn erased_flash_reads_as_default() {
        let erased = [0xFFu8; RECORD_LEN];
        assert_eq!(
            PersistedPreference::decode(&erased, 3),
            PersistedPreference::DEFAULT
        );
    }

    #[test]
    fn out_of_range_index_reads_as_default() {
        let record = [5u8, 0, 0, 0];
        assert_eq!(
            PersistedPreference::decode(&record, 3),
            PersistedPreference::DEFAULT
        );
    }

    #[test]
    fn empty_record_reads_as_default() {
        assert_eq!(
            PersistedPreference::decode(&[], 3),
            PersistedPreference::DEFAULT
        );
    }
}
