//! API middleware.
//!
//! Execution order (outermost → innermost):
//! 1. Access logger, wraps every route
//! 2. Rate limiter, triage submissions only

pub mod audit;
pub mod rate;
