//! Appointment desk: admission rules, status lifecycle, and HTTP routes for booking
//! single-slot appointments inside a short business window.

pub mod booking;
pub mod config;
pub mod error;
pub mod telemetry;
