//! Build, probe and download avatar images from the qlogo.cn service.

pub mod avatar;
pub mod error;
pub mod logging;
pub mod utils;

pub use avatar::{
    build_url, preset_urls, AvatarClient, BatchSummary, ClientConfig, Endpoints, Identifier,
    Quality, SizePreset,
};
pub use error::{AvatarError, Result};
