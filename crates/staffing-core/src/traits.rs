//! Core traits shared by domain entities

/// Primary key type
pub type Id = i64;

/// A persisted domain entity
pub trait Entity: Send + Sync {
    /// Name used in not-found errors
    const TYPE_NAME: &'static str;

    fn id(&self) -> Id;
}
