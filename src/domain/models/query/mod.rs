pub mod api_features;

pub use api_features::{ApiFeatures, FieldSelection};
