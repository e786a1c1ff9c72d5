//! Attendance Status & Salary Computation Engine
//!
//! This crate classifies staff check-in/check-out times against configured
//! shift windows and aggregates a month of classified attendance, leave and
//! configurable monetary rules into a payroll breakdown.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod rules;
