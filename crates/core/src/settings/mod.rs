pub mod config_handle;
pub mod detector_settings;
pub mod json_settings_store;
pub mod settings_error;
