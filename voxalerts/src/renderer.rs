//! Machine à états du rendu d'alerte
//!
//! Toutes les fonctions `execute_*` de [`RendererContext`] s'exécutent
//! sur le worker du [`SerialExecutor`], et uniquement là. Les méthodes
//! publiques de [`Renderer`] et les callbacks [`PlaybackObserver`] se
//! contentent de remettre l'opération en file et rendent la main
//! immédiatement : aucune mutation d'état hors du worker, donc aucun
//! verrou.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use voxplayer::{
    MediaPlayer, MediaSource, PlaybackErrorKind, PlaybackObserver, SourceId,
};
use voxutils::{ScheduledTask, SerialExecutor, WeakSubmitter};

use crate::{AlertAudio, AlertObserver, AlertState};

/// Phase courante du rendu, côté worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Aucun rendu en cours.
    Idle,
    /// Lecture de l'URL pointée par `next_url_index`.
    Url,
    /// Lecture du fichier local, séquence initiale ou repli.
    LocalFile,
    /// Entre deux passes de la séquence d'URLs, ré-entrée programmée.
    LoopPause,
}

/// Rendu audio d'une alerte, piloté par les callbacks du lecteur média.
///
/// Thread-safe : toutes les méthodes peuvent être appelées depuis
/// n'importe quel thread, elles ne font que soumettre du travail au
/// worker et retournent aussitôt.
pub struct Renderer {
    executor: SerialExecutor<RendererContext>,
}

impl Renderer {
    /// Crée un renderer adossé au lecteur donné et s'installe comme
    /// destinataire de ses callbacks de lecture.
    ///
    /// Le lecteur est emprunté pour la durée de vie du renderer, jamais
    /// possédé ; il peut servir à d'autres clients, mais jamais en même
    /// temps sur une même lecture active.
    ///
    /// Doit être appelé depuis un runtime Tokio.
    pub fn new(media_player: Arc<dyn MediaPlayer>) -> Arc<Self> {
        let player = media_player.clone();
        let executor = SerialExecutor::spawn_with(move |submitter| RendererContext {
            media_player: player,
            observer: None,
            audio: AlertAudio::default(),
            next_url_index: 0,
            loops_left: 0,
            is_stopping: false,
            current_source: None,
            phase: Phase::Idle,
            pending_loop: None,
            submitter,
        });
        let renderer = Arc::new(Self { executor });
        media_player.set_observer(renderer.clone());
        renderer
    }

    /// Remplace l'observateur pour toutes les notifications à venir.
    /// Sans effet sur un rendu en cours.
    pub fn set_observer(&self, observer: Arc<dyn AlertObserver>) {
        self.enqueue(move |ctx| ctx.execute_set_observer(Some(observer)));
    }

    /// Retire l'observateur courant ; les notifications deviennent des
    /// no-ops.
    pub fn clear_observer(&self) {
        self.enqueue(|ctx| ctx.execute_set_observer(None));
    }

    /// Démarre le rendu d'une alerte.
    ///
    /// Erreur d'usage si un rendu est déjà actif : l'appel est
    /// journalisé et ignoré, l'état n'est pas touché.
    pub fn start(&self, audio: AlertAudio) {
        self.enqueue(move |ctx| ctx.execute_start(audio));
    }

    /// Demande l'arrêt du rendu en cours. Sans rendu actif, no-op.
    ///
    /// L'arrêt est une demande asynchrone au lecteur mais fait foi
    /// immédiatement pour la logique du renderer : plus aucune
    /// progression de boucle ou de repli n'est lancée ensuite, même
    /// avant la confirmation du lecteur.
    pub fn stop(&self) {
        self.enqueue(|ctx| ctx.execute_stop());
    }

    fn enqueue<F>(&self, task: F)
    where
        F: FnOnce(&mut RendererContext) + Send + 'static,
    {
        if let Err(e) = self.executor.submit(task) {
            warn!("alert renderer worker rejected a task: {e}");
        }
    }
}

impl PlaybackObserver for Renderer {
    fn on_playback_started(&self, id: SourceId) {
        self.enqueue(move |ctx| ctx.execute_on_playback_started(id));
    }

    fn on_playback_stopped(&self, id: SourceId) {
        self.enqueue(move |ctx| ctx.execute_on_playback_stopped(id));
    }

    fn on_playback_finished(&self, id: SourceId) {
        self.enqueue(move |ctx| ctx.execute_on_playback_finished(id));
    }

    fn on_playback_error(&self, id: SourceId, kind: PlaybackErrorKind, message: String) {
        self.enqueue(move |ctx| ctx.execute_on_playback_error(id, kind, message));
    }
}

/// État du rendu, possédé par le worker du [`SerialExecutor`].
///
/// Invariant : `current_source` est `None` si et seulement si aucune
/// requête de lecture n'est en vol auprès du lecteur.
struct RendererContext {
    media_player: Arc<dyn MediaPlayer>,
    observer: Option<Arc<dyn AlertObserver>>,
    audio: AlertAudio,
    /// Curseur dans `audio.urls` pendant la phase `Url`.
    next_url_index: usize,
    /// Passes complètes restantes après celle en cours.
    loops_left: u32,
    /// Un stop a été demandé ; les callbacks suivants de la lecture
    /// courante sont des événements terminaux.
    is_stopping: bool,
    current_source: Option<SourceId>,
    phase: Phase,
    /// Ré-entrée de boucle programmée pendant `LoopPause`.
    pending_loop: Option<ScheduledTask>,
    submitter: WeakSubmitter<RendererContext>,
}

impl RendererContext {
    fn execute_set_observer(&mut self, observer: Option<Arc<dyn AlertObserver>>) {
        self.observer = observer;
    }

    fn execute_start(&mut self, audio: AlertAudio) {
        if self.phase != Phase::Idle {
            warn!("start requested while a render is active, ignoring");
            return;
        }
        if audio.local_file.as_os_str().is_empty() {
            warn!("start requested without a fallback audio file, ignoring");
            return;
        }
        info!(
            urls = audio.urls.len(),
            loops = audio.loop_count,
            "starting alert render"
        );
        self.audio = audio;
        self.next_url_index = 0;
        self.loops_left = self.audio.loop_count;
        self.is_stopping = false;
        if self.audio.urls.is_empty() {
            self.play_local_file();
        } else {
            self.play_url(0);
        }
    }

    fn execute_stop(&mut self) {
        if let Some(id) = self.current_source {
            debug!(source = %id, "stop requested, asking the player to stop");
            self.is_stopping = true;
            if let Err(e) = self.media_player.stop(id) {
                // Le lecteur ne confirmera jamais : on conclut ici.
                warn!(source = %id, "stop request failed: {e}");
                self.finish_with(AlertState::Stopped);
            }
        } else if self.phase == Phase::LoopPause {
            debug!("stop requested during the loop pause, cancelling the re-entry");
            self.finish_with(AlertState::Stopped);
        } else {
            debug!("stop requested while idle, nothing to do");
        }
    }

    fn execute_on_playback_started(&mut self, id: SourceId) {
        if !self.is_current(id) {
            return;
        }
        self.notify(AlertState::Started);
    }

    fn execute_on_playback_stopped(&mut self, id: SourceId) {
        if !self.is_current(id) {
            return;
        }
        self.finish_with(AlertState::Stopped);
    }

    fn execute_on_playback_finished(&mut self, id: SourceId) {
        if !self.is_current(id) {
            return;
        }
        if self.is_stopping {
            // La ressource s'est terminée pendant qu'un stop était en
            // vol : c'est l'événement terminal du stop.
            self.finish_with(AlertState::Stopped);
            return;
        }
        match self.phase {
            Phase::LocalFile => self.finish_with(AlertState::Finished),
            Phase::Url => {
                let next = self.next_url_index + 1;
                if next < self.audio.urls.len() {
                    self.play_url(next);
                } else if self.loops_left > 0 {
                    self.begin_loop_pause();
                } else {
                    self.finish_with(AlertState::Finished);
                }
            }
            Phase::Idle | Phase::LoopPause => {
                // Inatteignable tant que l'invariant sur current_source
                // tient : aucune lecture n'est en vol dans ces phases.
                warn!(source = %id, phase = ?self.phase, "finished callback in an unexpected phase");
            }
        }
    }

    fn execute_on_playback_error(
        &mut self,
        id: SourceId,
        kind: PlaybackErrorKind,
        message: String,
    ) {
        if !self.is_current(id) {
            return;
        }
        warn!(source = %id, %kind, "playback error: {message}");
        if self.is_stopping || self.phase == Phase::LocalFile {
            self.finish_with(AlertState::Error { kind, message });
            return;
        }
        // Repli unique : le fichier local garanti prend le relais, le
        // reste de la séquence d'URLs et les boucles sont abandonnés.
        info!("falling back to the local alert audio");
        self.current_source = None;
        self.play_local_file();
    }

    /// Ré-entrée de boucle, soumise en différé par `begin_loop_pause`.
    /// Un stop ou un nouveau rendu a pu la devancer dans la file : elle
    /// revérifie la phase avant de jouer quoi que ce soit.
    fn execute_loop_reentry(&mut self) {
        self.pending_loop = None;
        if self.is_stopping || self.phase != Phase::LoopPause {
            debug!("loop re-entry superseded, ignoring");
            return;
        }
        debug!("loop pause elapsed, replaying the url sequence");
        self.play_url(0);
    }

    fn begin_loop_pause(&mut self) {
        self.loops_left -= 1;
        self.current_source = None;
        self.phase = Phase::LoopPause;
        self.next_url_index = 0;
        debug!(
            remaining = self.loops_left,
            pause_ms = self.audio.loop_pause.as_millis() as u64,
            "url sequence exhausted, pausing before the next pass"
        );
        match self
            .submitter
            .submit_after(self.audio.loop_pause, |ctx| ctx.execute_loop_reentry())
        {
            Ok(pending) => self.pending_loop = Some(pending),
            Err(e) => {
                warn!("could not schedule the loop re-entry: {e}");
                self.finish_with(AlertState::Finished);
            }
        }
    }

    fn play_url(&mut self, index: usize) {
        self.next_url_index = index;
        let url = self.audio.urls[index].clone();
        debug!(index, "requesting playback of {url}");
        match self.media_player.play(MediaSource::url(url)) {
            Ok(id) => {
                self.current_source = Some(id);
                self.phase = Phase::Url;
            }
            Err(e) => {
                warn!("play request failed: {e}, falling back to the local alert audio");
                self.current_source = None;
                self.play_local_file();
            }
        }
    }

    fn play_local_file(&mut self) {
        let path = self.audio.local_file.clone();
        debug!("requesting playback of {}", path.display());
        match self.media_player.play(MediaSource::file(path)) {
            Ok(id) => {
                self.current_source = Some(id);
                self.phase = Phase::LocalFile;
            }
            Err(e) => {
                // Le repli lui-même est irrécupérable.
                error!("fallback audio cannot play: {e}");
                self.finish_with(AlertState::Error {
                    kind: PlaybackErrorKind::InvalidRequest,
                    message: e.to_string(),
                });
            }
        }
    }

    /// Conclut le rendu : retour à `Idle`, notification terminale.
    fn finish_with(&mut self, state: AlertState) {
        self.current_source = None;
        self.phase = Phase::Idle;
        self.is_stopping = false;
        if let Some(pending) = self.pending_loop.take() {
            pending.cancel();
        }
        self.notify(state);
    }

    fn is_current(&self, id: SourceId) -> bool {
        if self.current_source == Some(id) {
            true
        } else {
            debug!(source = %id, "dropping a stale playback callback");
            false
        }
    }

    fn notify(&self, state: AlertState) {
        match &self.observer {
            Some(observer) => observer.on_render_state_change(state),
            None => debug!(?state, "no observer registered, dropping notification"),
        }
    }
}
