use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::env::{EnvConfig, LOCALE_VAR, TRANSCRIPT_PREFIX_VAR};
use crate::i18n::{CatalogFormatter, MessageFormatter};
use crate::state::{SnapshotStore, Transcript, DEFAULT_TRANSCRIPT_PREFIX};

/// 运行配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub locale: String,
    pub transcript_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            locale: "en".to_string(),
            transcript_prefix: DEFAULT_TRANSCRIPT_PREFIX.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            debug: EnvConfig::is_debug_mode(),
            locale: EnvConfig::get_env_optional(LOCALE_VAR).unwrap_or(defaults.locale),
            transcript_prefix: EnvConfig::get_env_optional(TRANSCRIPT_PREFIX_VAR)
                .unwrap_or(defaults.transcript_prefix),
        }
    }

    pub fn formatter(&self) -> Arc<dyn MessageFormatter> {
        Arc::new(CatalogFormatter::new(self.locale.clone()))
    }

    pub fn transcript(&self, store: Arc<dyn SnapshotStore>) -> Transcript {
        Transcript::with_prefix(store, self.transcript_prefix.clone())
    }
}
