//! Prompt augmentation with live external data.
//!
//! The latest user utterance is cleaned and site-filtered, then answered
//! from government statistics (ACS, BLS, BEA) when the question is about a
//! known county, otherwise from a web search. Whatever was found is merged
//! into the system message before the conversation goes to a provider.

pub mod preprocess;
pub mod prompt;
pub mod search;
pub mod sources;
pub mod statistics;

pub use preprocess::{apply_site_filter, latest_user_message, preprocess, PreparedQuery};
pub use prompt::{augment, inject_system, Augmentation};
pub use search::{SearchConfig, SearchResult, WebSearcher};
pub use sources::{DataSourceProfile, SourceRegistry};
pub use statistics::{StatSource, StatisticsConfig, StatisticsHit, StatisticsLookup};
