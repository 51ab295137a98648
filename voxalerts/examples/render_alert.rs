//! Exemple de rendu d'alerte avec un lecteur simulé
//!
//! Le lecteur simulé « joue » chaque ressource pendant une seconde puis
//! rapporte la fin de lecture, ce qui permet d'observer la séquence
//! d'URLs, la pause de boucle et la notification finale.
//!
//! Usage:
//!   cargo run --example render_alert

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use voxalerts::{AlertAudio, AlertObserver, AlertState, Renderer};
use voxplayer::{MediaPlayer, MediaSource, PlaybackObserver, PlayerError, SourceId};

/// Lecteur qui simule une seconde de lecture par ressource.
struct SimulatedPlayer {
    observer: Mutex<Option<Arc<dyn PlaybackObserver>>>,
    next_id: AtomicU64,
}

impl SimulatedPlayer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            observer: Mutex::new(None),
            next_id: AtomicU64::new(1),
        })
    }

    fn observer(&self) -> Option<Arc<dyn PlaybackObserver>> {
        self.observer.lock().unwrap().clone()
    }
}

impl MediaPlayer for SimulatedPlayer {
    fn play(&self, source: MediaSource) -> Result<SourceId, PlayerError> {
        let id = SourceId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        println!("[player] lecture de {source} (source {id})");
        if let Some(observer) = self.observer() {
            tokio::spawn(async move {
                observer.on_playback_started(id);
                tokio::time::sleep(Duration::from_secs(1)).await;
                observer.on_playback_finished(id);
            });
        }
        Ok(id)
    }

    fn stop(&self, id: SourceId) -> Result<(), PlayerError> {
        println!("[player] arrêt demandé pour la source {id}");
        if let Some(observer) = self.observer() {
            tokio::spawn(async move {
                observer.on_playback_stopped(id);
            });
        }
        Ok(())
    }

    fn set_observer(&self, observer: Arc<dyn PlaybackObserver>) {
        *self.observer.lock().unwrap() = Some(observer);
    }
}

/// Observateur qui relaie les notifications vers le main.
struct ChannelObserver {
    tx: mpsc::UnboundedSender<AlertState>,
}

impl AlertObserver for ChannelObserver {
    fn on_render_state_change(&self, state: AlertState) {
        let _ = self.tx.send(state);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialiser le logging
    tracing_subscriber::fmt::init();

    let player = SimulatedPlayer::new();
    let renderer = Renderer::new(player);

    let (tx, mut states) = mpsc::unbounded_channel();
    renderer.set_observer(Arc::new(ChannelObserver { tx }));

    // Deux URLs, une passe supplémentaire, une demi-seconde de pause.
    renderer.start(
        AlertAudio::new("/var/alerts/alarm.mp3")
            .with_urls([
                "http://cdn.example.com/alert-intro.mp3",
                "http://cdn.example.com/alert-body.mp3",
            ])
            .with_loop_count(1)
            .with_loop_pause(Duration::from_millis(500)),
    );

    while let Some(state) = states.recv().await {
        println!("[observer] état du rendu: {state:?}");
        if state != AlertState::Started {
            break;
        }
    }

    println!("Rendu terminé");
    Ok(())
}
