//! Services that compose ports into use cases.

mod assembly;

pub use assembly::{AssemblyError, SEARCH_PAGE_SIZE, ThreadAssembler, assemble_text, thread_title};
