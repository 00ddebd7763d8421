pub mod action_network;
pub mod automation;
pub mod blogger;
pub mod client;
pub mod donation;
pub mod email;
pub mod freshdesk;
pub mod humanitix;
pub mod receipts;
pub mod stripe;
