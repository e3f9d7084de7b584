//! Flash-backed storage for the preferred-network index.
//!
//! The record occupies the first word of the last sector of the data
//! partition. Writes erase the sector and program the word back with
//! interrupts disabled; this is the only critical section in the
//! firmware and stays as short as one erase plus one word program.

use embedded_storage::{ReadStorage, Storage};
use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use esp_rom_sys::rom::spiflash::{
    ESP_ROM_SPIFLASH_RESULT_OK, esp_rom_spiflash_erase_sector, esp_rom_spiflash_read,
    esp_rom_spiflash_unlock, esp_rom_spiflash_write,
};
use log::info;
use radarframe_core::prefs::PersistedPreference;

const FLASH_SECTOR_SIZE: u32 = 4096;
const DEFAULT_FLASH_CAPACITY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FlashPrefsError {
    PartitionTable,
    PrefsPartitionMissing,
    PartitionTooSmall,
    FlashOpFailed(i32),
    Unsupported,
}

#[derive(Debug)]
struct RawFlash;

impl RawFlash {
    fn new() -> Result<Self, FlashPrefsError> {
        let rc = unsafe { esp_rom_spiflash_unlock() };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashPrefsError::FlashOpFailed(rc));
        }
        Ok(Self)
    }

    fn read_word(&mut self, addr: u32) -> Result<u32, FlashPrefsError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashPrefsError::Unsupported);
        }

        let mut word = 0u32;
        let rc = unsafe { esp_rom_spiflash_read(addr, &mut word as *mut u32 as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashPrefsError::FlashOpFailed(rc));
        }
        Ok(word)
    }

    fn erase_sector(&mut self, sector_addr: u32) -> Result<(), FlashPrefsError> {
        if !sector_addr.is_multiple_of(FLASH_SECTOR_SIZE) {
            return Err(FlashPrefsError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_erase_sector(sector_addr / FLASH_SECTOR_SIZE) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashPrefsError::FlashOpFailed(rc));
        }
        Ok(())
    }

    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), FlashPrefsError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashPrefsError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_write(addr, &word as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashPrefsError::FlashOpFailed(rc));
        }
        Ok(())
    }

    fn read_bytes(&mut self, addr: u32, out: &mut [u8]) -> Result<(), FlashPrefsError> {
        let start = addr & !0b11;
        let end = (addr + out.len() as u32 + 3) & !0b11;

        for word_addr in (start..end).step_by(4) {
            let bytes = self.read_word(word_addr)?.to_le_bytes();
            let base = word_addr as i64 - addr as i64;

            for (i, b) in bytes.iter().enumerate() {
                let dst = base + i as i64;
                if dst < 0 {
                    continue;
                }
                let dst = dst as usize;
                if dst >= out.len() {
                    break;
                }
                out[dst] = *b;
            }
        }

        Ok(())
    }
}

impl ReadStorage for RawFlash {
    type Error = FlashPrefsError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read_bytes(offset, bytes)
    }

    fn capacity(&self) -> usize {
        DEFAULT_FLASH_CAPACITY_BYTES
    }
}

impl Storage for RawFlash {
    fn write(&mut self, _offset: u32, _bytes: &[u8]) -> Result<(), Self::Error> {
        Err(FlashPrefsError::Unsupported)
    }
}

/// Preference record in the last sector of the data partition.
#[derive(Debug)]
pub struct FlashPrefsStore {
    flash: RawFlash,
    record_addr: u32,
    network_count: usize,
}

impl FlashPrefsStore {
    pub fn new(network_count: usize) -> Result<Self, FlashPrefsError> {
        let mut flash = RawFlash::new()?;

        let mut table_buf = [0u8; PARTITION_TABLE_MAX_LEN];
        let table = read_partition_table(&mut flash, &mut table_buf)
            .map_err(|_| FlashPrefsError::PartitionTable)?;

        let mut region: Option<(u32, u32)> = None;
        for entry in table.iter() {
            if entry.is_read_only() || entry.len() < FLASH_SECTOR_SIZE {
                continue;
            }

            match entry.partition_type() {
                PartitionType::Data(DataPartitionSubType::Undefined) => {
                    region = Some((entry.offset(), entry.len()));
                    break;
                }
                PartitionType::Data(DataPartitionSubType::Nvs) => {
                    if region.is_none() {
                        region = Some((entry.offset(), entry.len()));
                    }
                }
                _ => {}
            }
        }

        let (offset, len) = region.ok_or(FlashPrefsError::PrefsPartitionMissing)?;
        if len < FLASH_SECTOR_SIZE {
            return Err(FlashPrefsError::PartitionTooSmall);
        }

        Ok(Self {
            flash,
            record_addr: offset + len - FLASH_SECTOR_SIZE,
            network_count,
        })
    }

    /// Restores the preference; any read failure reads as the default.
    pub fn load(&mut self) -> PersistedPreference {
        match self.flash.read_word(self.record_addr) {
            Ok(word) => PersistedPreference::decode(&word.to_le_bytes(), self.network_count),
            Err(_) => PersistedPreference::DEFAULT,
        }
    }

    /// Erase-then-program of the single record word.
    pub fn save(&mut self, pref: &PersistedPreference) -> Result<(), FlashPrefsError> {
        let word = u32::from_le_bytes(pref.encode());
        let result = critical_section::with(|_| {
            self.flash.erase_sector(self.record_addr)?;
            self.flash.write_word(self.record_addr, word)
        });

        if result.is_ok() {
            info!(
                "prefs: saved preferred_network_index={}",
                pref.preferred_network_index
            );
        }
        result
    }
}
