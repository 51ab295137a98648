use crate::{PlaybackErrorKind, SourceId};

/// Callbacks de cycle de vie émis par un lecteur média.
///
/// Le lecteur peut les invoquer depuis n'importe quel thread ; les
/// implémentations ne doivent donc jamais bloquer et se contenter de
/// remettre l'événement à leur propre mécanisme de sérialisation.
pub trait PlaybackObserver: Send + Sync {
    /// La lecture `id` a effectivement commencé.
    fn on_playback_started(&self, id: SourceId);

    /// La lecture `id` s'est arrêtée suite à une demande de stop.
    fn on_playback_stopped(&self, id: SourceId);

    /// La lecture `id` est arrivée au bout de sa ressource.
    fn on_playback_finished(&self, id: SourceId);

    /// La lecture `id` a échoué.
    fn on_playback_error(&self, id: SourceId, kind: PlaybackErrorKind, message: String);
}
