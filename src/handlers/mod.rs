// src/handlers/mod.rs

pub mod marks;
pub mod question;
pub mod question_set;
pub mod test_session;
