// src/utils/mod.rs

pub mod usn;
