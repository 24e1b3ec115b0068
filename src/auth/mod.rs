mod password;
pub use password::{hash_password, secrets_match, verify_password};
mod jwt;
pub use jwt::{
    IMPERSONATION_TTL, SESSION_TTL, UserClaims, generate_token, issue_session, process_token,
};
mod error;
pub use error::{CryptError, CryptResult};
