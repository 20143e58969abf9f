//! Reply-path handling for incoming messages.
//!
//! This module provides the glue between the messaging client and the
//! stored keyword table:
//! - Matching incoming text against the keywords
//! - Selecting the concrete reply (text variant rotation, media reference)
//! - Emitting the `incoming`/`outgoing` feed lines

pub mod incoming;
