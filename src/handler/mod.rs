pub mod construction;
pub mod requests;
