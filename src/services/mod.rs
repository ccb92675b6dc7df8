pub mod accounts;
pub mod handlers;
pub mod pagination;
pub mod response;
pub mod validation;
