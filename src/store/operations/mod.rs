pub mod activity;
pub mod attempts;
pub mod events;
pub mod profiles;
