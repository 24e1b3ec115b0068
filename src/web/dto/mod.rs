pub mod account;
pub mod admin;
pub mod catalog;
pub mod commerce;
pub mod learning;
