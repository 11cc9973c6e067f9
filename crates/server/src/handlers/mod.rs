//! HTTP request handlers.

pub(crate) mod flowchart;
pub(crate) mod landing;
pub(crate) mod logs;
pub(crate) mod session;
