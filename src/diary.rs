pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod timezone;
pub mod validation;

pub use repository::{EntryRepository, MemoryEntryRepository, PgEntryRepository};
pub use service::DiaryService;
