//! The client sending requests to a HAL API and following links between resources.

mod builder;
mod hapi;

pub use builder::HapiClientBuilder;
pub use hapi::HapiClient;
