pub mod confirm_handler;

pub use confirm_handler::confirm_handler;
