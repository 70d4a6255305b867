pub mod catalog;
pub mod favourites;
pub mod health;
pub mod users;

pub use catalog::*;
pub use favourites::*;
pub use health::*;
pub use users::*;

use crate::responses::ApiResponse;
use crate::utils::StorefrontError;
use worker::{Response, Result};

/// Translate a service error 1:1 into the response envelope.
pub(crate) fn error_response(err: StorefrontError) -> Result<Response> {
    let response = ApiResponse::<()>::error(err.message.clone());
    Ok(Response::from_json(&response)?.with_status(err.http_status()))
}
