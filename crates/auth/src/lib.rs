mod pkce;

pub mod client;
pub mod flow;
pub mod http;
pub mod memory;

pub use client::{AuthBackend, AuthClient};
pub use flow::{LoginFlow, LoginOutcome, AUTHENTICATED_ROUTE};
pub use http::{AuthConfig, HttpAuthClient};
pub use memory::MemoryAuthClient;
