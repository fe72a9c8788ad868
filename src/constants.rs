//! Shared constants used across the application.

/// User agent sent with every API request.
pub const USER_AGENT: &str = concat!("glowfic-archiver/", env!("CARGO_PKG_VERSION"));

/// Default site root for API calls and permalinks.
pub const DEFAULT_SITE_URL: &str = "https://www.glowfic.com";

/// Directory, relative to the document, holding cached avatars.
pub const DEFAULT_IMAGES_SUBDIR: &str = "images";
