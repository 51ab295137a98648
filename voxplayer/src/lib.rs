//! Abstraction du lecteur média
//!
//! Cette crate définit le contrat entre un moteur de lecture concret
//! (matériel, logiciel ou double de test) et les composants qui lui
//! demandent de jouer des ressources : les opérations [`MediaPlayer`]
//! d'un côté, les notifications de cycle de vie [`PlaybackObserver`] de
//! l'autre.
//!
//! Un appel à [`MediaPlayer::play`] retourne immédiatement un
//! [`SourceId`] ; la lecture elle-même progresse de façon asynchrone et
//! son issue est rapportée par callbacks, toujours porteurs du
//! [`SourceId`] concerné pour que le destinataire puisse écarter les
//! échos d'une opération remplacée.

mod observer;
mod player;
mod types;

pub use observer::PlaybackObserver;
pub use player::{MediaPlayer, PlayerError};
pub use types::{MediaSource, PlaybackErrorKind, SourceId};
