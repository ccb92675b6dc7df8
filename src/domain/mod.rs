pub mod account;
pub mod contact;
pub mod engagement;
pub mod post;
