pub mod budget;
pub mod cache;
pub mod expense;
pub mod income;
pub mod money;
pub mod month;
pub mod pocket;
pub mod realtime;
pub mod summary;
pub mod transfer;
