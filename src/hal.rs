//! The HAL data model: resources with their state, links and embedded resources.
//!
//! See https://datatracker.ietf.org/doc/html/draft-kelly-json-hal

mod link;
mod rel;
mod relations;
mod resource;

pub use link::Link;
pub use rel::{CustomRel, RegisteredRel, Rel};
pub use relations::{OneOrMany, Relations};
pub use resource::Resource;
