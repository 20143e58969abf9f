pub use crate::base::{
    config::Config,
    error::Error as ServiceError,
    types::{Err, Res, Void},
};
pub use anyhow::anyhow;
pub use tracing::{debug, error, info, instrument, warn};
