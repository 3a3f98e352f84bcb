pub mod catalog;
pub mod classification;
pub mod diagnostics;
pub mod mixer;
pub mod providers;
pub mod random;
pub mod recency;
pub mod recommendations;
pub mod search;
pub mod stylist;
pub mod synthesizer;

pub use catalog::LocalCatalog;
pub use classification::ClassificationRules;
pub use mixer::PhotoAggregator;
pub use random::RandomSource;
pub use recency::RecencyCache;
pub use recommendations::{RecommendationEngine, RecommendationFetcher, Recommendations};
pub use search::SearchAdapter;
pub use stylist::Stylist;
pub use synthesizer::PreferenceSynthesizer;
