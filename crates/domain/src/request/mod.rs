//! Request types

mod api_request;
mod headers;
mod method;

pub use api_request::ApiRequest;
pub use headers::{AUTHORIZATION, Header, Headers};
pub use method::HttpMethod;
