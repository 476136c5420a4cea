//! Domain layer: plain types and rules with no I/O.

pub mod entities;
pub mod errors;
pub mod locale;
pub mod mapping;
pub mod path_template;
pub mod period;
pub mod progress;
