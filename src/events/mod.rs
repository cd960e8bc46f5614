pub mod callback;
pub mod handler;
