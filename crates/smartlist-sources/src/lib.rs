pub mod error;
pub mod traits;
pub mod trakt;

pub use error::{FailureKind, SourceError};
pub use traits::{CatalogService, ListStore, RemoteList};
pub use trakt::TraktClient;
