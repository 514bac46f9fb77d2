pub mod errors;
pub mod id;
pub mod notifications;

pub use errors::{ConfigError, NanochatError};
pub use id::SessionId;
pub use notifications::{Notification, NotificationLevel, NotificationQueue};

pub type Result<T> = std::result::Result<T, NanochatError>;
