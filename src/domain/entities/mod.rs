pub mod account;
pub mod funding;
pub mod history;
pub mod market;
pub mod orders;
pub mod query;
