//! Contrat de résultat HTTP asynchrone
//!
//! Cette crate fournit la brique [`HttpContent`] : le résultat d'une
//! requête HTTP en cours dont le code de statut, le content-type et le
//! flux de données se résolvent indépendamment. La couche de transport
//! remplit le contrat exactement une fois via [`HttpContentWriter`] ;
//! n'importe quel consommateur peut attendre les valeurs de son côté
//! sans bloquer le producteur.
//!
//! [`fetch`] est le point d'entrée qui produit un [`HttpContent`] depuis
//! un GET `reqwest` en streaming.

mod content;
mod error;
mod fetch;
mod stream;

pub use content::{HttpContent, HttpContentWriter};
pub use error::HttpContentError;
pub use fetch::fetch;
pub use stream::{data_stream, DataStream, DataStreamWriter, DEFAULT_STREAM_CAPACITY};
