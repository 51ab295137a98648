use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpContentError {
    /// Le producteur a abandonné la requête avant de résoudre cette
    /// valeur.
    #[error("the fetch was abandoned before this value resolved")]
    Aborted,
    /// Le consommateur du flux de données a disparu.
    #[error("the data stream consumer is gone")]
    StreamClosed,
}
