pub mod flash_prefs;
