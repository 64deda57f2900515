mod api_key;
mod asset;
mod chat;
mod log;
mod message;
mod search;
mod settings;
mod tool;

pub use api_key::{generate_api_key, ApiKeyDbService, API_KEY_PREFIX};
pub use asset::{AssetStorageService, ASSETS_BUCKET, LEGACY_DOCUMENTS_BUCKET};
pub use chat::ChatDbService;
pub use log::{spawn_log, LogDbService};
pub use message::MessageDbService;
pub use search::{SearchService, SEARCH_CHUNKS_FUNCTION};
pub use settings::SettingsDbService;
pub use tool::ToolDbService;
