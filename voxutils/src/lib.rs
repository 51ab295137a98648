//! Utilitaires de concurrence pour le workspace voxalert
//!
//! Cette crate fournit le [`SerialExecutor`], la seule primitive de
//! synchronisation du workspace : un worker unique qui possède un état et
//! exécute des tâches soumises depuis n'importe quel thread, strictement
//! dans l'ordre de soumission.

mod executor;

pub use executor::{
    ExecutorError, ScheduledTask, SerialExecutor, Submitter, Task, WeakSubmitter,
};
