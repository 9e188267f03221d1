pub mod google;

pub use google::{DEFAULT_TOKENINFO_URL, GoogleTokenVerifier};
