pub mod error;
pub mod manifest;
pub mod naming;
pub mod provider;
pub mod types;

pub use error::{ManifestError, ProviderError, StackError};
pub use manifest::{Manifest, Service, TomlManifestLoader};
pub use naming::upper_name;
pub use provider::*;
pub use types::*;
