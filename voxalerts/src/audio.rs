use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Paramètres audio d'une alerte.
///
/// `local_file` est la ressource de repli toujours disponible sur
/// l'appareil ; elle joue seule quand `urls` est vide, et prend le
/// relais si une URL échoue. `loop_count` compte les passes
/// supplémentaires de la séquence d'URLs après la première (0 = une
/// seule passe), séparées par `loop_pause`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertAudio {
    pub local_file: PathBuf,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub loop_count: u32,
    #[serde(default)]
    pub loop_pause: Duration,
}

impl AlertAudio {
    pub fn new<P: Into<PathBuf>>(local_file: P) -> Self {
        Self {
            local_file: local_file.into(),
            ..Self::default()
        }
    }

    pub fn with_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_loop_count(mut self, loop_count: u32) -> Self {
        self.loop_count = loop_count;
        self
    }

    pub fn with_loop_pause(mut self, loop_pause: Duration) -> Self {
        self.loop_pause = loop_pause;
        self
    }
}
