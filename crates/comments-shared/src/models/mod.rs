mod comment;
mod task;
mod timestamp;

pub use comment::*;
pub use task::*;
pub use timestamp::*;
