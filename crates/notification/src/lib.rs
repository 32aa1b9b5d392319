mod service;

pub use lettre::Message;
pub use service::*;
