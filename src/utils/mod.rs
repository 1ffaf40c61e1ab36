// Utility functions
pub mod conversion;
pub mod sanitize;
pub mod validation;
