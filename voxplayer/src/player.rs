use std::sync::Arc;

use thiserror::Error;

use crate::{MediaSource, PlaybackObserver, SourceId};

/// Échec d'une requête adressée au lecteur.
///
/// Ne couvre que le refus immédiat de la requête ; une lecture acceptée
/// qui échoue ensuite est rapportée par
/// [`PlaybackObserver::on_playback_error`].
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("media player rejected the source: {0}")]
    Rejected(String),
    #[error("no playback is registered under source id {0}")]
    UnknownSource(SourceId),
}

/// Contrat minimal d'un moteur de lecture.
///
/// `play` retourne immédiatement l'identifiant de la nouvelle lecture ;
/// `stop` est une demande, la confirmation arrive via
/// [`PlaybackObserver::on_playback_stopped`]. Les implémentations doivent
/// rendre la main rapidement : le vrai travail se fait hors de l'appel.
///
/// Un lecteur peut être partagé par plusieurs clients successifs, mais
/// jamais concurremment sur un même [`SourceId`] actif.
pub trait MediaPlayer: Send + Sync {
    /// Demande la lecture d'une ressource et retourne son identifiant.
    fn play(&self, source: MediaSource) -> Result<SourceId, PlayerError>;

    /// Demande l'arrêt de la lecture identifiée par `id`.
    fn stop(&self, id: SourceId) -> Result<(), PlayerError>;

    /// Installe le destinataire des callbacks de cycle de vie.
    /// Remplace le destinataire précédent.
    fn set_observer(&self, observer: Arc<dyn PlaybackObserver>);
}
