pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod list;
pub mod models;
pub mod sequence;
pub mod session;
pub mod storage;
pub mod teams;

// Re-export commonly used types
pub use config::{determine_session_path, get_config_path, Config, DEFAULT_SESSION_FILE};
pub use error::{ListError, StorageError};
pub use graph::GraphEdit;
pub use list::EntityList;
pub use models::{
    Competence, CompetenceId, Link, Member, MemberId, ParseMemberIdError, Team, TeamId, TeamLink,
};
pub use sequence::Sequenced;
pub use session::Session;
pub use storage::{SessionData, Storage, FORMAT_VERSION};
