//! Rendu audio des alertes
//!
//! Cette crate rend la séquence sonore d'une alerte : une suite d'URLs
//! distantes, éventuellement bouclée, avec un fichier local garanti en
//! ressource de repli si une URL refuse de jouer.
//!
//! # Architecture
//!
//! Le [`Renderer`] ne touche jamais son état depuis le thread appelant.
//! Chaque opération publique et chaque callback du lecteur média est
//! remis à un [`voxutils::SerialExecutor`] et traité dans l'ordre
//! d'arrivée sur un unique worker : la machine à états n'a besoin
//! d'aucun verrou, et l'entrelacement start/stop/callbacks devient un
//! simple journal d'événements totalement ordonné.
//!
//! Les callbacks portent l'identifiant de la lecture qui les a émis ;
//! tout callback dont l'identifiant ne correspond pas à la lecture
//! courante est un écho d'une opération remplacée et il est écarté sans
//! toucher ni à l'état ni à l'observateur.

mod audio;
mod observer;
mod renderer;

pub use audio::AlertAudio;
pub use observer::{AlertObserver, AlertState};
pub use renderer::Renderer;
