pub mod task;
pub mod tasklist;

pub use task::*;
pub use tasklist::*;
