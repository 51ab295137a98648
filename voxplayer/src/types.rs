use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identifiant opaque d'une requête de lecture.
///
/// Chaque [`crate::MediaPlayer::play`] accepté retourne un id distinct ;
/// tous les callbacks ultérieurs le portent, ce qui permet de distinguer
/// l'opération courante d'un écho périmé.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(u64);

impl SourceId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ressource que le lecteur sait jouer : une URL distante ou un fichier
/// local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaSource {
    Url(String),
    File(PathBuf),
}

impl MediaSource {
    pub fn url<S: Into<String>>(url: S) -> Self {
        Self::Url(url.into())
    }

    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        Self::File(path.into())
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Url(url) => write!(f, "{url}"),
            MediaSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Taxonomie fermée des erreurs de lecture rapportées par un lecteur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackErrorKind {
    /// Cause indéterminée.
    Unknown,
    /// La requête elle-même était invalide (ressource malformée,
    /// id inconnu, lecteur saturé).
    InvalidRequest,
    /// La ressource distante est inaccessible.
    ServiceUnavailable,
    /// Le service distant a répondu par une erreur interne.
    InternalServiceError,
    /// Le moteur de lecture local a échoué.
    InternalDeviceError,
}

impl fmt::Display for PlaybackErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlaybackErrorKind::Unknown => "unknown",
            PlaybackErrorKind::InvalidRequest => "invalid request",
            PlaybackErrorKind::ServiceUnavailable => "service unavailable",
            PlaybackErrorKind::InternalServiceError => "internal service error",
            PlaybackErrorKind::InternalDeviceError => "internal device error",
        };
        write!(f, "{label}")
    }
}
