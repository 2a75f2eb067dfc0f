pub mod movie;
pub mod planned;
pub mod user;
pub mod watched;
