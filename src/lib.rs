//! Linked Open Data export of the DECODE database of historical ciphers.
//!
//! Two independent steps share nothing but a JSON file on disk: [`api`]
//! harvests record summaries and details from the DECODE REST API, [`onto`]
//! maps the harvested details onto the DECRYPT ontology and writes RDF Turtle.
pub mod api;
pub mod config;
pub mod onto;
pub mod record;
