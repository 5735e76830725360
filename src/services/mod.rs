pub mod assignments;
pub mod order_status;
pub mod orders;
pub mod payments;
pub mod process_steps;
pub mod ratings;
pub mod settings;
