pub mod controller;
pub mod flow;

pub use controller::ConfirmationController;
pub use flow::ConfirmationFlow;
