//! Field resolution
//!
//! Turns mapping entries into concrete values for one part: SQL text
//! construction ([`sql`]), composite combination rules ([`composite`]),
//! and the resolver itself ([`resolver`]).

pub mod composite;
pub mod resolver;
pub mod sql;

pub use composite::CompositeRule;
pub use resolver::{FieldFailure, FieldResolver, Resolution};
