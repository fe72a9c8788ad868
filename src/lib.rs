//! Glowfic thread archiver library.
//!
//! Fetches a thread from the Glowfic JSON API into a [`story::Story`] and
//! renders stories into self-contained HTML documents suitable for reading
//! offline or converting to an ebook.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod config;
pub mod constants;
pub mod fs_utils;
pub mod glowfic;
pub mod render;
pub mod story;
