//! User profile readers

mod in_memory;
mod postgres_reader;

pub use in_memory::InMemoryProfileReader;
pub use postgres_reader::PgUserProfileReader;
