//! Request authentication via Supabase access tokens or API keys

mod api_key;
mod guard;
mod token;

pub use api_key::{authenticate_with_api_key, API_KEY_HEADER};
pub use token::authenticate_with_token;
