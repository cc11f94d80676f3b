//! Scanalyze - Cosmetic Ingredient Safety Analysis
//!
//! This crate resolves cosmetic ingredient names across chemical databases,
//! scales animal toxicity data to human-equivalent doses, and scores
//! products against a user's health profile.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
