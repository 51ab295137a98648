//! Exécuteur série mono-worker
//!
//! Le [`SerialExecutor`] possède un état `S` sur un unique worker Tokio et
//! consomme une file FIFO de tâches `FnOnce(&mut S)`. Toute mutation de `S`
//! passe par cette file : aucun verrou n'est nécessaire, l'ordre des tâches
//! est l'ordre de soumission, et deux tâches ne s'exécutent jamais en même
//! temps.
//!
//! La soumission est non bloquante depuis n'importe quel thread. Les tâches
//! différées ([`Submitter::submit_after`]) passent par la même file au moment
//! où leur délai expire, si bien que le worker reste disponible pendant
//! l'attente pour traiter les soumissions ordinaires.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Tâche exécutée par le worker sur l'état qu'il possède.
///
/// Les tâches doivent rendre la main rapidement : une tâche qui bloque
/// retarde toutes les soumissions suivantes.
pub type Task<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// L'exécuteur a été arrêté, la tâche n'a pas été acceptée.
    #[error("executor is shut down")]
    ShutDown,
    /// Le worker a disparu sans rendre son état (panic d'une tâche).
    #[error("executor worker vanished before returning its state")]
    WorkerLost,
}

enum Command<S> {
    Run(Task<S>),
    Stop,
}

struct Shared {
    closed: AtomicBool,
}

impl Shared {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Poignée de soumission clonable vers un [`SerialExecutor`].
pub struct Submitter<S> {
    tx: mpsc::UnboundedSender<Command<S>>,
    shared: Arc<Shared>,
}

impl<S> Clone for Submitter<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            shared: self.shared.clone(),
        }
    }
}

impl<S: 'static> Submitter<S> {
    /// Soumet une tâche en fin de file. Ne bloque jamais l'appelant.
    pub fn submit<F>(&self, task: F) -> Result<(), ExecutorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        if self.shared.is_closed() {
            return Err(ExecutorError::ShutDown);
        }
        self.tx
            .send(Command::Run(Box::new(task)))
            .map_err(|_| ExecutorError::ShutDown)
    }

    /// Soumet une tâche qui rejoindra la file après `delay`.
    ///
    /// Le délai court sur une tâche Tokio annexe ; le worker n'est jamais
    /// endormi et continue de traiter les soumissions ordinaires pendant
    /// l'attente. Annuler le [`ScheduledTask`] retourné avant l'expiration
    /// garantit que la tâche n'entrera jamais dans la file.
    pub fn submit_after<F>(&self, delay: Duration, task: F) -> Result<ScheduledTask, ExecutorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        if self.shared.is_closed() {
            return Err(ExecutorError::ShutDown);
        }
        Ok(schedule(
            self.tx.downgrade(),
            self.shared.clone(),
            delay,
            Box::new(task),
        ))
    }

    /// Version non propriétaire de cette poignée.
    ///
    /// Un `WeakSubmitter` ne maintient pas le worker en vie : il permet à
    /// l'état lui-même de re-soumettre des tâches sans créer de cycle.
    pub fn downgrade(&self) -> WeakSubmitter<S> {
        WeakSubmitter {
            tx: self.tx.downgrade(),
            shared: self.shared.clone(),
        }
    }
}

/// Poignée de soumission qui ne maintient pas l'exécuteur en vie.
pub struct WeakSubmitter<S> {
    tx: mpsc::WeakUnboundedSender<Command<S>>,
    shared: Arc<Shared>,
}

impl<S> Clone for WeakSubmitter<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            shared: self.shared.clone(),
        }
    }
}

impl<S: 'static> WeakSubmitter<S> {
    pub fn submit<F>(&self, task: F) -> Result<(), ExecutorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        if self.shared.is_closed() {
            return Err(ExecutorError::ShutDown);
        }
        let tx = self.tx.upgrade().ok_or(ExecutorError::ShutDown)?;
        tx.send(Command::Run(Box::new(task)))
            .map_err(|_| ExecutorError::ShutDown)
    }

    pub fn submit_after<F>(&self, delay: Duration, task: F) -> Result<ScheduledTask, ExecutorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        if self.shared.is_closed() {
            return Err(ExecutorError::ShutDown);
        }
        Ok(schedule(
            self.tx.clone(),
            self.shared.clone(),
            delay,
            Box::new(task),
        ))
    }
}

/// Programme l'entrée en file d'une tâche après un délai.
///
/// Le sender est conservé sous forme faible : un exécuteur abandonné pendant
/// le délai n'est pas retenu en vie par ses timers.
fn schedule<S: 'static>(
    tx: mpsc::WeakUnboundedSender<Command<S>>,
    shared: Arc<Shared>,
    delay: Duration,
    task: Task<S>,
) -> ScheduledTask {
    let token = CancellationToken::new();
    let guard = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = guard.cancelled() => {
                debug!("scheduled task cancelled before firing");
            }
            _ = tokio::time::sleep(delay) => {
                if shared.is_closed() {
                    return;
                }
                match tx.upgrade() {
                    Some(tx) => {
                        let _ = tx.send(Command::Run(task));
                    }
                    None => debug!("scheduled task fired after executor was dropped"),
                }
            }
        }
    });
    ScheduledTask { token }
}

/// Poignée d'annulation d'une tâche différée.
///
/// Laisser tomber la poignée n'annule pas la tâche ; l'annulation est
/// toujours explicite via [`ScheduledTask::cancel`].
#[derive(Debug)]
pub struct ScheduledTask {
    token: CancellationToken,
}

impl ScheduledTask {
    /// Empêche la tâche d'entrer dans la file si son délai n'a pas expiré.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Exécuteur série : un worker unique, un état possédé, une file FIFO.
pub struct SerialExecutor<S> {
    submitter: Submitter<S>,
    worker: JoinHandle<S>,
}

impl<S: Send + 'static> SerialExecutor<S> {
    /// Démarre le worker avec l'état donné.
    ///
    /// Doit être appelé depuis un runtime Tokio.
    pub fn spawn(state: S) -> Self {
        Self::spawn_with(move |_| state)
    }

    /// Démarre le worker en laissant le constructeur d'état capturer un
    /// [`WeakSubmitter`] vers sa propre file, pour que les tâches puissent
    /// re-soumettre (tâches différées notamment).
    pub fn spawn_with<F>(init: F) -> Self
    where
        F: FnOnce(WeakSubmitter<S>) -> S,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let submitter = Submitter {
            tx,
            shared: Arc::new(Shared {
                closed: AtomicBool::new(false),
            }),
        };
        let mut state = init(submitter.downgrade());
        let worker = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Command::Run(task) => task(&mut state),
                    Command::Stop => break,
                }
            }
            state
        });
        Self { submitter, worker }
    }

    pub fn submit<F>(&self, task: F) -> Result<(), ExecutorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.submitter.submit(task)
    }

    pub fn submit_after<F>(&self, delay: Duration, task: F) -> Result<ScheduledTask, ExecutorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.submitter.submit_after(delay, task)
    }

    /// Retourne une poignée de soumission supplémentaire.
    pub fn submitter(&self) -> Submitter<S> {
        self.submitter.clone()
    }

    /// Arrête l'exécuteur : refuse les nouvelles soumissions, draine les
    /// tâches déjà en file, attend l'arrêt complet du worker puis rend
    /// l'état. L'état n'est jamais détruit pendant que le worker tourne.
    pub async fn shutdown(self) -> Result<S, ExecutorError> {
        self.submitter.shared.closed.store(true, Ordering::Release);
        let _ = self.submitter.tx.send(Command::Stop);
        self.worker.await.map_err(|_| ExecutorError::WorkerLost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tasks_run_in_submission_order() {
        let executor = SerialExecutor::spawn(Vec::new());
        for i in 0..100u32 {
            executor.submit(move |log: &mut Vec<u32>| log.push(i)).unwrap();
        }
        let log = executor.shutdown().await.unwrap();
        assert_eq!(log, (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn per_submitter_order_is_preserved_under_concurrency() {
        let executor = SerialExecutor::spawn(Vec::new());
        let mut producers = Vec::new();
        for tag in 0..4u32 {
            let submitter = executor.submitter();
            producers.push(tokio::spawn(async move {
                for i in 0..50u32 {
                    submitter
                        .submit(move |log: &mut Vec<(u32, u32)>| log.push((tag, i)))
                        .unwrap();
                    tokio::task::yield_now().await;
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }
        let log = executor.shutdown().await.unwrap();
        assert_eq!(log.len(), 200);
        for tag in 0..4u32 {
            let seen: Vec<u32> = log.iter().filter(|(t, _)| *t == tag).map(|(_, i)| *i).collect();
            assert_eq!(seen, (0..50).collect::<Vec<_>>(), "ordre du producteur {tag}");
        }
    }

    #[tokio::test]
    async fn shutdown_drains_already_queued_tasks() {
        let executor = SerialExecutor::spawn(0u32);
        for _ in 0..10 {
            executor.submit(|count: &mut u32| *count += 1).unwrap();
        }
        let count = executor.shutdown().await.unwrap();
        assert_eq!(count, 10);
    }

    #[tokio::test]
    async fn submission_after_shutdown_is_rejected() {
        let executor = SerialExecutor::spawn(());
        let submitter = executor.submitter();
        executor.shutdown().await.unwrap();
        assert!(matches!(
            submitter.submit(|_: &mut ()| {}),
            Err(ExecutorError::ShutDown)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_task_fires_after_delay() {
        let executor = SerialExecutor::spawn(false);
        executor
            .submit_after(Duration::from_secs(1), |fired: &mut bool| *fired = true)
            .unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        let fired = executor.shutdown().await.unwrap();
        assert!(fired);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_scheduled_task_never_runs() {
        let executor = SerialExecutor::spawn(false);
        let pending = executor
            .submit_after(Duration::from_secs(1), |fired: &mut bool| *fired = true)
            .unwrap();
        pending.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;
        let fired = executor.shutdown().await.unwrap();
        assert!(!fired, "une tâche annulée ne doit jamais s'exécuter");
    }

    #[tokio::test]
    async fn weak_submitter_does_not_keep_worker_alive() {
        let executor = SerialExecutor::spawn(());
        let weak = executor.submitter().downgrade();
        assert!(weak.submit(|_: &mut ()| {}).is_ok());
        drop(executor);
        tokio::task::yield_now().await;
        assert!(matches!(
            weak.submit(|_: &mut ()| {}),
            Err(ExecutorError::ShutDown)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn state_can_resubmit_through_weak_submitter() {
        struct Counter {
            hits: u32,
            submitter: WeakSubmitter<Counter>,
        }
        let executor = SerialExecutor::spawn_with(|submitter| Counter { hits: 0, submitter });
        executor
            .submit(|state: &mut Counter| {
                state.hits += 1;
                state
                    .submitter
                    .submit_after(Duration::from_millis(100), |state: &mut Counter| {
                        state.hits += 1;
                    })
                    .unwrap();
            })
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        let state = executor.shutdown().await.unwrap();
        assert_eq!(state.hits, 2);
    }
}
