mod api_key;
mod chat;
mod log;
mod message;
mod tool;
mod user;

pub use api_key::*;
pub use chat::*;
pub use log::*;
pub use message::*;
pub use tool::*;
pub use user::*;

use serde::Serialize;
use uuid::Uuid;

/// Insert payload with the owning user's ID injected alongside the row data
#[derive(Serialize)]
pub struct UserOwned<'a, T: Serialize> {
    pub user_id: &'a Uuid,
    #[serde(flatten)]
    pub data: &'a T,
}
