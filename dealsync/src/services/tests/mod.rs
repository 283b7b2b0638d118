//! Tests for the concrete sources and the CRM client
//!
//! The CRM client runs against a local wiremock server; CSV sources read
//! fixtures written to temporary files.

pub mod pipedrive_client;
