//! Core runtime components: collectors, the collection executor and
//! publishers.

pub mod collectors;
pub mod executor;
pub mod publisher;
