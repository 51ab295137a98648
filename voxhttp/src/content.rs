use tokio::sync::watch;
use tracing::debug;

use crate::{DataStream, HttpContentError};

/// Résultat d'une requête HTTP en cours.
///
/// Les trois composantes se résolvent indépendamment : le code de statut
/// et le content-type arrivent avec l'en-tête de la réponse, le flux de
/// données existe (ou non) dès la création du contrat et son contenu
/// s'écoule ensuite à son propre rythme.
///
/// Le succès n'implique pas la présence d'un flux, et un échec ne
/// l'exclut pas : une réponse d'erreur peut transporter un corps
/// décrivant l'erreur.
#[derive(Debug)]
pub struct HttpContent {
    status: watch::Receiver<Option<u16>>,
    content_type: watch::Receiver<Option<String>>,
    /// Flux du corps de la réponse, absent si aucun octet ne sera
    /// récupéré. Le consommateur le prend et le draine de son côté.
    pub data_stream: Option<DataStream>,
}

impl HttpContent {
    /// Crée le contrat et sa moitié producteur.
    ///
    /// La présence du flux de données est décidée ici, avant que le
    /// moindre octet ne circule.
    pub fn channel(data_stream: Option<DataStream>) -> (HttpContentWriter, HttpContent) {
        let (status_tx, status_rx) = watch::channel(None);
        let (content_type_tx, content_type_rx) = watch::channel(None);
        (
            HttpContentWriter {
                status: status_tx,
                content_type: content_type_tx,
            },
            HttpContent {
                status: status_rx,
                content_type: content_type_rx,
                data_stream,
            },
        )
    }

    /// Attend et retourne le code de statut HTTP.
    pub async fn status_code(&self) -> Result<u16, HttpContentError> {
        let mut rx = self.status.clone();
        let value = rx
            .wait_for(|code| code.is_some())
            .await
            .map_err(|_| HttpContentError::Aborted)?;
        (*value).ok_or(HttpContentError::Aborted)
    }

    /// Attend et retourne le content-type de la réponse.
    pub async fn content_type(&self) -> Result<String, HttpContentError> {
        let mut rx = self.content_type.clone();
        let value = rx
            .wait_for(|ct| ct.is_some())
            .await
            .map_err(|_| HttpContentError::Aborted)?;
        (*value).clone().ok_or(HttpContentError::Aborted)
    }

    /// Attend le code de statut et vérifie qu'il vaut exactement 200.
    ///
    /// Une requête abandonnée compte comme un échec.
    pub async fn is_success(&self) -> bool {
        matches!(self.status_code().await, Ok(200))
    }

    /// Détache le flux de données, s'il existe.
    pub fn take_stream(&mut self) -> Option<DataStream> {
        self.data_stream.take()
    }
}

/// Moitié producteur d'un [`HttpContent`].
///
/// La couche de transport remplit chaque valeur exactement une fois.
/// Lâcher le writer sans avoir rempli une valeur résout les attentes
/// correspondantes en [`HttpContentError::Aborted`].
#[derive(Debug)]
pub struct HttpContentWriter {
    status: watch::Sender<Option<u16>>,
    content_type: watch::Sender<Option<String>>,
}

impl HttpContentWriter {
    pub fn set_status_code(&self, code: u16) {
        if self.status.send(Some(code)).is_err() {
            debug!("status code {code} resolved after every consumer left");
        }
    }

    pub fn set_content_type<S: Into<String>>(&self, content_type: S) {
        if self.content_type.send(Some(content_type.into())).is_err() {
            debug!("content type resolved after every consumer left");
        }
    }
}
