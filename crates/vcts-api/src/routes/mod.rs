//! # Route Modules
//!
//! Each module defines an Axum router for one API surface area. Routers
//! are assembled in [`crate::app`].

pub mod status;
pub mod vc_data_model;
