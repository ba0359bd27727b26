//! Collects construction elements into emittable statements and
//! orders them so referenced labels are defined before use.

pub mod collector;
pub mod generator;
pub mod labels;
pub mod scheduler;
pub mod source;

pub use collector::collect;
pub use generator::Generator;
pub use scheduler::schedule;
pub use source::{Algorithm, Construction, ConstructionNode, MacroSource};
