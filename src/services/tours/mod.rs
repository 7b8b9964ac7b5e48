pub mod tour_service;

pub use tour_service::{TOP_FIVE_CHEAP_QUERY, TourService};
