//! Response assembly

pub mod assembler;
pub mod envelope;

pub use assembler::{apology, Rendered, ResponseAssembler};
pub use envelope::{Directive, ResponseBuilder, ResponseEnvelope};
