//! Schema-validated form state.
//!
//! A [`ValidationSchema`] declares the constraints for a fixed set of fields
//! and a [`FormController`] tracks values, per-field errors and the
//! submission lifecycle against it. Field sets are closed enums implementing
//! [`FormField`].

mod controller;
mod schema;
mod server;

pub use controller::{FormController, SubmitGate};
pub use schema::{FieldErrors, FormField, FormValues, Rule, ValidationSchema};
pub use server::{IMAGE_URL_REQUIRED, NAME_REQUIRED, ServerField, server_schema};
