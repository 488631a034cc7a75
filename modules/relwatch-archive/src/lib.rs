pub mod archive;
pub mod cascade;
pub mod extract;
pub mod hosted;
pub mod services;
pub mod store;
pub mod terms;
pub mod traits;

#[cfg(feature = "test-support")]
pub mod testing;

pub use archive::{Archive, HarvestReport};
pub use cascade::{Cascade, Stage, Step};
pub use store::{CorpusDocument, JsonCorpusStore};
pub use terms::QueryTerms;
pub use traits::{BrowserAutomation, CorpusStore, HostedHit, HostedSearch, Upserted};
