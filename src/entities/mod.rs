pub mod customer;
pub mod employee;
pub mod employee_rating;
pub mod order;
pub mod order_rating;
pub mod order_status_history;
pub mod process_step;
pub mod system_setting;
