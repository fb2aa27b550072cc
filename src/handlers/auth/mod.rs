pub mod reset_handler;
pub mod signup_handler;

pub use reset_handler::reset_password_handler;
pub use signup_handler::signup_handler;
