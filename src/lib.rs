//! Contact relay: a contact-form endpoint that classifies, stores and
//! forwards each submission to an operator.

pub mod classify;
pub mod config;
pub mod contact;
pub mod error;
pub mod notify;
pub mod store;
