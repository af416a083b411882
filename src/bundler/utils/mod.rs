//! Filesystem, HTTP and checksum helpers shared by the Linux bundler.

pub mod checksum;
pub mod fs;
pub mod http;
