pub mod blog;
pub mod donation;
pub mod event;
pub mod monitor;
pub mod receipt;
pub mod signup;
pub mod signup_gate;
