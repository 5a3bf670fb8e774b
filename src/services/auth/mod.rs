pub mod credential_lookup;
pub mod password;
pub mod sign_in;
pub mod token_codec;

pub use credential_lookup::{CredentialLookup, LookupError, PgCredentialLookup, Principal};
pub use password::PasswordHasher;
pub use sign_in::SignInService;
pub use token_codec::TokenCodec;
