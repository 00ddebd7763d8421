pub mod blog;
pub mod contact;
pub mod events;
pub mod payment;
pub mod receipt;
pub mod signup;
