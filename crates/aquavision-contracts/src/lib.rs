pub mod chat;
pub mod events;
pub mod image;
pub mod models;
pub mod outcome;
pub mod report;
pub mod session;
