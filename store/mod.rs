pub mod feature_store;
pub mod loader;

pub use feature_store::{FeatureScan, FeatureStore};
pub use loader::parse_features;
