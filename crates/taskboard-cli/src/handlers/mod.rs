pub mod board;
pub mod column;
pub mod comment;
pub mod ticket;
pub mod user;
