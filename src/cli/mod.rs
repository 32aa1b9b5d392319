pub mod pending;
pub mod server;
pub mod smtp;
