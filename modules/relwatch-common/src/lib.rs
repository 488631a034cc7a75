pub mod cancel;
pub mod config;
pub mod dates;
pub mod error;
pub mod file_config;
pub mod lexicon;
pub mod persist;
pub mod sources;
pub mod types;

pub use cancel::CancellationToken;
pub use config::AppConfig;
pub use dates::{extract_date, normalize, DateFormat};
pub use error::{RelwatchError, Result};
pub use file_config::{FileConfig, RetrievalConfig, RosterEntry};
pub use lexicon::{fold, Lexicon};
pub use sources::{Selectors, SourceConfig, SourceRegistry};
pub use types::*;
