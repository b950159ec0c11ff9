//! Remote storage of the moonpost configuration document.
//!
//! The document lives in an external YAML store ("YSS") addressed by a single
//! URL: `GET` returns the whole document, `PUT` replaces it.

pub mod traits;
pub mod yss;

pub use traits::{ConfigStore, StoreError};
pub use yss::YssStore;
