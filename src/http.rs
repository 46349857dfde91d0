//! Describing HTTP calls: what to send, how to encode it and who sends it.

mod body;
mod method;
mod request;
pub(crate) mod template;
mod transport;

pub use body::{JsonBody, MessageBody, UrlEncodedBody};
pub use method::Method;
pub use request::{Follow, Request, UrlVariables};
pub use template::UrlVariable;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
