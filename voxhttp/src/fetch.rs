use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::{data_stream, HttpContent, DEFAULT_STREAM_CAPACITY};

/// Lance un GET en streaming et retourne immédiatement le contrat de
/// résultat.
///
/// La requête part sur une tâche de fond qui remplit le code de statut
/// et le content-type dès l'en-tête de réponse, puis pompe le corps dans
/// le flux de données. Un échec de transport avant l'en-tête abandonne le
/// contrat ([`crate::HttpContentError::Aborted`] côté consommateur).
///
/// Le flux de données est toujours présent pour un GET : son existence
/// est décidée ici, au dispatch, que la réponse soit un succès ou non.
/// Doit être appelé depuis un runtime Tokio.
pub fn fetch<S: Into<String>>(client: reqwest::Client, url: S) -> HttpContent {
    let url = url.into();
    let (body_writer, body) = data_stream(DEFAULT_STREAM_CAPACITY);
    let (writer, content) = HttpContent::channel(Some(body));

    tokio::spawn(async move {
        debug!("dispatching GET {url}");
        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("GET {url} failed before a response arrived: {e}");
                return;
            }
        };

        writer.set_status_code(response.status().as_u16());
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        writer.set_content_type(content_type);

        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    if body_writer.write(bytes).await.is_err() {
                        debug!("GET {url}: consumer dropped the body stream, aborting the pump");
                        return;
                    }
                }
                Err(e) => {
                    warn!("GET {url}: body stream interrupted: {e}");
                    return;
                }
            }
        }
        debug!("GET {url}: body fully streamed");
    });

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpContentError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_resolves_status_content_type_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/alert.mp3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"mp3-bytes".to_vec())
                    .insert_header("content-type", "audio/mpeg"),
            )
            .mount(&server)
            .await;

        let mut content = fetch(reqwest::Client::new(), format!("{}/alert.mp3", server.uri()));

        assert!(content.is_success().await);
        assert_eq!(content.status_code().await.unwrap(), 200);
        assert_eq!(content.content_type().await.unwrap(), "audio/mpeg");

        let body = content.take_stream().expect("GET attache toujours un flux");
        assert_eq!(body.collect().await, b"mp3-bytes");
    }

    #[tokio::test]
    async fn error_response_still_carries_its_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_bytes(b"not here".to_vec())
                    .insert_header("content-type", "text/plain"),
            )
            .mount(&server)
            .await;

        let mut content = fetch(reqwest::Client::new(), format!("{}/missing", server.uri()));

        assert!(!content.is_success().await);
        assert_eq!(content.status_code().await.unwrap(), 404);

        // Un échec n'exclut pas un corps : la réponse d'erreur se lit.
        let body = content.take_stream().unwrap();
        assert_eq!(body.collect().await, b"not here");
    }

    #[tokio::test]
    async fn transport_failure_aborts_the_contract() {
        // Rien n'écoute sur ce port.
        let content = fetch(reqwest::Client::new(), "http://127.0.0.1:9/nope");

        assert_eq!(content.status_code().await, Err(HttpContentError::Aborted));
        assert!(!content.is_success().await);
    }

    #[tokio::test]
    async fn body_streams_independently_of_the_status() {
        let server = MockServer::start().await;
        let payload = vec![0xABu8; 64 * 1024];
        Mock::given(method("GET"))
            .and(path("/large"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(payload.clone())
                    .insert_header("content-type", "application/octet-stream"),
            )
            .mount(&server)
            .await;

        let mut content = fetch(reqwest::Client::new(), format!("{}/large", server.uri()));
        let mut body = content.take_stream().unwrap();

        // Le statut se résout sans que le corps soit drainé.
        assert_eq!(content.status_code().await.unwrap(), 200);

        let mut total = 0usize;
        while let Some(chunk) = body.next_chunk().await {
            total += chunk.len();
        }
        assert_eq!(total, payload.len());
    }
}
