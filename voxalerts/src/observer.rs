use serde::{Deserialize, Serialize};
use voxplayer::PlaybackErrorKind;

/// États grossiers du rendu, tels que vus par l'observateur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertState {
    /// Le rendu a effectivement commencé à jouer.
    Started,
    /// Le rendu s'est arrêté suite à une demande de stop.
    Stopped,
    /// Le rendu est arrivé naturellement à son terme.
    Finished,
    /// Le rendu a échoué et le repli est épuisé.
    Error {
        kind: PlaybackErrorKind,
        message: String,
    },
}

/// Destinataire des notifications d'état du rendu.
///
/// Les notifications sont émises dans l'ordre où les événements
/// sous-jacents ont été traités, depuis le worker du renderer ; elles ne
/// doivent pas bloquer. Décider de journaliser, remonter ou relancer
/// appartient à l'observateur.
pub trait AlertObserver: Send + Sync {
    fn on_render_state_change(&self, state: AlertState);
}
