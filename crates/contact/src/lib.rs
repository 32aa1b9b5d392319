mod compose;
mod pipeline;
mod store;
mod submission;

pub use compose::*;
pub use pipeline::*;
pub use store::*;
pub use submission::*;
