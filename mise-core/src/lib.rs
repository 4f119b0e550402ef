pub mod config;
pub mod error;
pub mod identity;
pub mod logging;

pub use config::{
    ConfigError, ConfigProperties, ConfigValidationDetail, ConfigValue,
    DefaultSecretResolver, FromConfigValue, MiseConfig, PropertyMeta, SecretResolver,
};
pub use error::AppError;
pub use identity::Identity;
pub use logging::{init_tracing, init_tracing_with};

pub mod prelude {
    //! Re-exports of the most commonly used core types.
    pub use crate::{AppError, ConfigError, ConfigProperties, Identity, MiseConfig};
}
