pub mod blog;
pub mod events;
pub mod freshdesk;
pub mod payments;
pub mod receipts;
pub mod signup;
