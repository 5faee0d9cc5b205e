pub mod config;
pub mod error;
pub mod logging;

pub use config::AppConfig;
pub use error::{KanbanError, KanbanResult};
pub use logging::{LogEntry, Loggable, NoticeLevel, NoticeLog};
