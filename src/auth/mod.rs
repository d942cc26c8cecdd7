//! Authentication
//!
//! Bearer tokens are verified into an explicit [`AuthContext`] that handlers
//! pass down to the services. There is no ambient session state.

mod context;
mod jwt;

pub use context::{AuthContext, Role};
pub use jwt::{generate_access_token, verify_token, Claims, JwtError, JwtSecret};
