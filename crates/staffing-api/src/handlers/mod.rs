//! Request handlers

pub mod teaching_contracts;
