//! JOIN algorithm implementations.

mod hash;

pub use hash::HashJoin;
