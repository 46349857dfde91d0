//! Authentication methods, adding credentials to requests right before they are sent.

mod oauth2;
mod token;

pub use oauth2::Oauth2BasicAuthentication;
pub use token::ExpirableToken;

use crate::errors::HapiError;
use crate::http::Request;
use crate::HapiClient;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Decorates each request sent by a [HapiClient].
///
/// The client is given so that the method can send requests of its own,
/// e.g. to get an access token. Such requests are authorized too, so a
/// method must recognize its own requests and let them through.
#[async_trait]
pub trait AuthenticationMethod: Debug + Send + Sync {
    /// Return the request to send in place of the given one.
    async fn authorize_request(&self, client: &HapiClient, request: Request) -> Result<Request, HapiError>;
}

#[async_trait]
impl<A: AuthenticationMethod + ?Sized> AuthenticationMethod for Arc<A> {
    async fn authorize_request(&self, client: &HapiClient, request: Request) -> Result<Request, HapiError> {
        (**self).authorize_request(client, request).await
    }
}
