//! A client for REST APIs using [HAL](https://datatracker.ietf.org/doc/html/draft-kelly-json-hal)
//! hypermedia.
//!
//! Start from the entry point of the API and follow links to the resources you need:
//!
//! ```no_run
//! use hapi_client::{Follow, HapiClient, Oauth2BasicAuthentication, Rel};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HapiClient::builder()?
//!     .api_url("https://api.example.com")
//!     .authentication(Oauth2BasicAuthentication::new("/oauth/token", "userid", "password"))
//!     .build()?;
//! let creditors = Follow::new(Rel::custom("creditors")?).with_variable("reference", "abc");
//! let creditor = client.send_follow(creditors, None).await?;
//! println!("{:?}", creditor.state());
//! # Ok(())
//! # }
//! ```

pub mod auth;
mod client;
pub mod errors;
pub mod hal;
pub mod http;
#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthenticationMethod, ExpirableToken, Oauth2BasicAuthentication};
pub use client::{HapiClient, HapiClientBuilder};
pub use errors::HapiError;
pub use hal::{CustomRel, Link, OneOrMany, RegisteredRel, Rel, Relations, Resource};
pub use http::{Follow, JsonBody, Method, Request, UrlEncodedBody, UrlVariable};
