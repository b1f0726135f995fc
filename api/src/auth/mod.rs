//! Authentication
//!
//! Bearer session tokens issued by `/auth/signin` and `/auth/signup`.

pub mod session_token;

pub use session_token::auth_middleware;
