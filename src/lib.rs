//! Content-scraping API: social feeds, football data and image edits behind
//! one HTTP surface.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(non_upper_case_globals)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]

/// Process configuration and credential groups.
pub mod config;
/// Football query-resolution and browser-scraping pipeline.
pub mod football;
/// Image lookups (Getty Images photos, imgflip meme templates).
pub mod images;
/// LLM call-outs (Gemini image editing).
pub mod llm;
/// HTTP server and API routes.
pub mod server;
/// Social content adapters (Reddit, Telegram, Instagram).
pub mod social;
/// Entry helpers to start the server.
pub mod startup;
