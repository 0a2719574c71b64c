//! Pipeline module - name resolution, batched fan-out, record assembly and
//! batch orchestration.

mod assembler;
mod batch;
mod orchestrator;
mod resolver;
mod session;

pub use assembler::*;
pub use batch::*;
pub use orchestrator::*;
pub use resolver::*;
pub use session::*;
