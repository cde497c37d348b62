//! The request capability resource handles depend on.

use crate::error::Result;
use crate::http::Params;
use crate::response::Response;

/// Issues authenticated requests against API endpoints.
///
/// Resource code (`BlogRef`, `PostRef`, the `get_*` helpers) only needs this
/// trait, so it works with any implementor, not just `TumblrClient`.
pub trait TransportProvider {
    fn get_with_params(&self, endpoint: &str, params: &Params) -> Result<Response>;
    fn post_with_params(&self, endpoint: &str, params: &Params) -> Result<Response>;
    fn put_with_params(&self, endpoint: &str, params: &Params) -> Result<Response>;
    fn delete_with_params(&self, endpoint: &str, params: &Params) -> Result<Response>;

    fn get(&self, endpoint: &str) -> Result<Response> {
        self.get_with_params(endpoint, &Params::new())
    }

    fn post(&self, endpoint: &str) -> Result<Response> {
        self.post_with_params(endpoint, &Params::new())
    }

    fn put(&self, endpoint: &str) -> Result<Response> {
        self.put_with_params(endpoint, &Params::new())
    }

    fn delete(&self, endpoint: &str) -> Result<Response> {
        self.delete_with_params(endpoint, &Params::new())
    }
}
