//! Ingredient mapping handlers.

mod identity_mapper;

pub use identity_mapper::IdentityMapper;
