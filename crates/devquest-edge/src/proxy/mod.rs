mod error;
mod headers;
mod server;
mod target;

pub use error::ProxyError;
pub use headers::{DEFAULT_ALLOW_LIST, HOP_BY_HOP_HEADERS, HeaderPolicy, response_headers};
pub use server::{AppState, EdgeServer, build_client, carries_body, create_router};
pub use target::{BackendTarget, PATH_PARAM, TargetResolver};
