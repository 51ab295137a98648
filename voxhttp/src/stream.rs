use bytes::Bytes;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tokio_util::io::StreamReader;

use crate::HttpContentError;

/// Capacité par défaut du canal de flux (chunks en attente avant que le
/// producteur ne subisse la backpressure).
pub const DEFAULT_STREAM_CAPACITY: usize = 16;

/// Crée une paire producteur/consommateur pour un flux de données.
pub fn data_stream(capacity: usize) -> (DataStreamWriter, DataStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (DataStreamWriter { tx }, DataStream { rx })
}

/// Moitié producteur d'un flux de données.
///
/// Le producteur écrit des chunks jusqu'à la fin du contenu puis lâche le
/// writer, ce qui signale la fin du flux au consommateur.
#[derive(Debug, Clone)]
pub struct DataStreamWriter {
    tx: mpsc::Sender<Bytes>,
}

impl DataStreamWriter {
    pub async fn write(&self, chunk: Bytes) -> Result<(), HttpContentError> {
        self.tx
            .send(chunk)
            .await
            .map_err(|_| HttpContentError::StreamClosed)
    }
}

/// Moitié consommateur d'un flux de données.
#[derive(Debug)]
pub struct DataStream {
    rx: mpsc::Receiver<Bytes>,
}

impl DataStream {
    /// Prochain chunk, ou `None` quand le producteur a terminé.
    pub async fn next_chunk(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Draine le flux entier en mémoire.
    pub async fn collect(mut self) -> Vec<u8> {
        let mut data = Vec::new();
        while let Some(chunk) = self.next_chunk().await {
            data.extend_from_slice(&chunk);
        }
        data
    }

    /// Adapte le flux en lecteur [`AsyncRead`].
    pub fn into_reader(self) -> impl AsyncRead + Send {
        StreamReader::new(ReceiverStream::new(self.rx).map(Ok::<_, std::io::Error>))
    }
}
