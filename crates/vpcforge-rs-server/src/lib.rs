//! HTTP surface for vpcforge.
//!
//! Routes:
//! - `POST /vpc` creates a network
//! - `GET /vpc` lists stored networks (`?limit=`)
//! - `GET /vpc/{vpc_id}` fetches one network
//! - `DELETE /vpc/{vpc_id}` tears a network down
//!
//! Every body is wrapped in the `{success, data}` / `{success: false, error}`
//! envelope.

mod app;
pub mod error;
mod middleware;
mod routes;
pub mod state;

pub use app::{router, serve};
pub use error::{ApiFailure, ServerError};
pub use middleware::{REQUEST_ID_HEADER, RequestId};
pub use state::AppState;
