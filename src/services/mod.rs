// src/services/mod.rs

pub mod marks;
pub mod session;

pub use marks::MarksCalculator;
pub use session::SessionOrchestrator;
