//! Pipeline stages for resume evaluation.
//!
//! Each submodule implements one step, so each can be tested alone and the
//! rendering backend or provider can be swapped without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ llm
//! (bytes)   (page 1)   (JPEG/b64)  (one provider call)
//! ```
//!
//! 1. [`input`]: hold the uploaded bytes and reject non-PDF input early
//! 2. [`render`]: rasterise the first page; blocking, run via `spawn_blocking`
//! 3. [`encode`]: JPEG-compress and base64-wrap the page
//! 4. [`llm`]: pair the payload with an instruction and call the provider

pub mod encode;
pub mod input;
pub mod llm;
pub mod render;
