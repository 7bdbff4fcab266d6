//! Core export engine
//!
//! Mapping ingestion, field resolution, template rendering, generation
//! tracking, and the coordinator that ties them together.

pub mod export;
pub mod mapping;
pub mod render;
pub mod resolve;
pub mod track;
