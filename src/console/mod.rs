pub mod console_state;
pub mod session;
