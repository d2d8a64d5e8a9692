pub mod errors;
pub mod kanister;
pub mod logging;
pub mod profiles;
pub mod root;
pub mod schedule;
pub mod server;

pub use errors::ConfigError;
pub use kanister::{KanisterConfig, KubernetesConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use profiles::{ProfileConfig, RetentionConfig, WindowsConfig};
pub use root::{CliOverrides, Config};
pub use schedule::ScheduleConfig;
pub use server::ServerConfig;
