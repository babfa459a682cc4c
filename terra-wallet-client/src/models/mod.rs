//! Data models used throughout the client
//!
//! Request bodies for each wallet service route and the opaque response
//! wrapper that is threaded from one workflow step into the next.

// Transaction route bodies
pub mod tx;

// Key listing and lookup bodies
pub mod keys;
