//! Value model for tabquery
//!
//! Scalars are a small closed set: Null, Boolean, Number, String.
//! Coercion happens only at explicit points:
//!
//! - numeric comparison in WHERE (`>`, `<`, `>=`, `<=`)
//! - aggregation math (SUM, AVG, MIN, MAX)
//! - loose equality in WHERE (`=`, `!=`)
//!
//! Ordering never coerces.

mod record;
mod value;

pub use record::Record;
pub use value::Value;
