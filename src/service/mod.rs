pub mod cache;
pub mod cache_keys;
pub mod care;
pub mod environment;
pub mod facility;
pub mod geocoding;
pub mod open_meteo;
pub mod openaq;
pub mod outbreak;
pub mod overpass;
pub mod symptoms;

pub use cache::UpstreamCache;
pub use care::CareRouter;
pub use environment::{EnvironmentError, EnvironmentService};
pub use facility::{FacilityError, FacilityLocator};
pub use geocoding::{GeocodeError, Geocoder, GeocodingClient};
pub use outbreak::OutbreakAggregator;
pub use overpass::OverpassClient;
pub use symptoms::SymptomMatcher;
