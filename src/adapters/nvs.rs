//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] by storing [`PropConfig`] as a single postcard
//! blob under `relayprop/propcfg`.  Bindings are never stored here: the
//! control room republishes its retained settings on every reconnect.
//!
//! - **`target_os = "espidf"`** — raw `nvs_*` calls on the default partition.
//! - **`not(target_os = "espidf")`** — in-memory map for host tests.

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::PropConfig;
use crate::error::ConfigError;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_sys::*;

// Bindgen exposes the error macros as `u32`; `esp_err_t` is signed.
#[cfg(target_os = "espidf")]
const OK: esp_err_t = ESP_OK as esp_err_t;
#[cfg(target_os = "espidf")]
const NOT_FOUND: esp_err_t = ESP_ERR_NVS_NOT_FOUND as esp_err_t;
#[cfg(target_os = "espidf")]
const INVALID_LENGTH: esp_err_t = ESP_ERR_NVS_INVALID_LENGTH as esp_err_t;

const CONFIG_NAMESPACE: &[u8] = b"relayprop\0";
const CONFIG_KEY: &[u8] = b"propcfg\0";

/// Upper bound on the stored blob; anything larger is treated as corrupt.
const MAX_BLOB_SIZE: usize = 1024;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: HashMap<&'static [u8], Vec<u8>>,
}

impl NvsAdapter {
    /// Initialise NVS flash.
    ///
    /// On a full partition or after an IDF version change the partition is
    /// erased and re-initialised, losing any stored config.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before anything else
            // touches NVS.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: HashMap::new(),
        })
    }

    /// Open the config namespace, run `f` with the handle, then close it.
    #[cfg(target_os = "espidf")]
    fn with_handle<T>(
        write: bool,
        f: impl FnOnce(nvs_handle_t) -> Result<T, esp_err_t>,
    ) -> Result<T, esp_err_t> {
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        let ret = unsafe { nvs_open(CONFIG_NAMESPACE.as_ptr().cast(), mode, &mut handle) };
        if ret != OK {
            return Err(ret);
        }
        let result = f(handle);
        unsafe { nvs_close(handle) };
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_blob() -> Result<Option<Vec<u8>>, ConfigError> {
        let result = Self::with_handle(false, |handle| {
            let mut size: usize = 0;
            let ret = unsafe {
                nvs_get_blob(handle, CONFIG_KEY.as_ptr().cast(), core::ptr::null_mut(), &mut size)
            };
            if ret != OK {
                return Err(ret);
            }
            if size == 0 || size > MAX_BLOB_SIZE {
                return Err(INVALID_LENGTH);
            }
            let mut buf = vec![0u8; size];
            let ret = unsafe {
                nvs_get_blob(handle, CONFIG_KEY.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
            };
            if ret != OK {
                return Err(ret);
            }
            Ok(buf)
        });
        match result {
            Ok(bytes) => Ok(Some(bytes)),
            // A fresh partition has no namespace yet either.
            Err(e) if e == NOT_FOUND => Ok(None),
            Err(e) if e == INVALID_LENGTH => Err(ConfigError::Corrupted),
            Err(e) => {
                warn!("NvsAdapter: NVS read error {e}");
                Err(ConfigError::IoError)
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        match self.store.get(CONFIG_KEY) {
            Some(bytes) if bytes.len() > MAX_BLOB_SIZE => Err(ConfigError::Corrupted),
            other => Ok(other.cloned()),
        }
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        Self::with_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(handle, CONFIG_KEY.as_ptr().cast(), bytes.as_ptr().cast(), bytes.len())
            };
            if ret != OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != OK {
                return Err(ret);
            }
            Ok(())
        })
        .map_err(|e| {
            warn!("NvsAdapter: NVS write error {e}");
            ConfigError::IoError
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        self.store.insert(CONFIG_KEY, bytes.to_vec());
        Ok(())
    }

    /// Overwrite the stored blob with arbitrary bytes (corruption tests).
    #[cfg(not(target_os = "espidf"))]
    pub fn put_raw(&mut self, bytes: &[u8]) {
        self.store.insert(CONFIG_KEY, bytes.to_vec());
    }
}

impl NvsAdapter {
    /// Whether a config blob has been written.
    pub fn has_config(&self) -> bool {
        #[cfg(target_os = "espidf")]
        let blob = Self::read_blob();
        #[cfg(not(target_os = "espidf"))]
        let blob = self.read_blob();
        matches!(blob, Ok(Some(_)))
    }

    /// Boot-time config.  Never fails: an unusable blob falls back to the
    /// defaults.  Defaults that carry Wi-Fi credentials are written back on
    /// first boot so later firmware images keep them.
    pub fn load_or_commission(&mut self) -> PropConfig {
        self.load_or_commission_with(PropConfig::default())
    }

    fn load_or_commission_with(&mut self, defaults: PropConfig) -> PropConfig {
        if !self.has_config() {
            if !defaults.wifi_ssid.is_empty() {
                match self.save(&defaults) {
                    Ok(()) => info!("NvsAdapter: commissioned from build defaults"),
                    Err(e) => warn!("NvsAdapter: cannot store defaults ({e})"),
                }
            }
            return defaults;
        }
        match self.load() {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("NvsAdapter: stored config unusable ({e}), using defaults");
                defaults
            }
        }
    }
}

impl ConfigPort for NvsAdapter {
    /// Stored config, or defaults when nothing has been stored yet.
    fn load(&self) -> Result<PropConfig, ConfigError> {
        #[cfg(target_os = "espidf")]
        let blob = Self::read_blob()?;
        #[cfg(not(target_os = "espidf"))]
        let blob = self.read_blob()?;

        let Some(bytes) = blob else {
            info!("NvsAdapter: no stored config, using defaults");
            return Ok(PropConfig::default());
        };
        let cfg: PropConfig = postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
        Ok(cfg)
    }

    fn save(&mut self, config: &PropConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.write_blob(&bytes)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}
