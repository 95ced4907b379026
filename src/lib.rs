pub mod config;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod payload;
pub mod reference_seed;
pub mod response;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod store;
pub mod validation;
pub mod workers;
