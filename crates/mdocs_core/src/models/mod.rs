//! Data models for API requests and cached document views.

/// Document tree, normalized index, and article payloads.
pub mod doc;
/// Request bodies accepted by the document endpoints.
pub mod request;
