//! Template rendering and file emission.

mod emit;
mod placeholder;

pub use emit::{EmitError, EmitOutcome, EmitResult, WriteMode, emit};
pub use placeholder::{Resolver, Segment, TemplateError, Vars, parse, substitute, substitute_segments};
