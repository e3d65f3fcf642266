//! Pipeline stages for post-to-PDF export.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. change the page geometry or the embedding
//! format) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! resolve ──▶ encode ──▶ layout ──▶ emit
//! (URL/path)  (JPEG +    (blocks,   (PDF syntax,
//!              size)      pages)     streamed)
//! ```
//!
//! 1. [`resolve`] — fetch or read the cover image; every failure degrades
//!    to "no image" because decoration must not abort an export
//! 2. [`encode`]  — decode the resolved bytes, re-encode for embedding,
//!    record the intrinsic size the layout step scales against
//! 3. [`fonts`]   — Helvetica metrics backing all text measurement
//! 4. [`layout`]  — pure composition: wrap, justify, paginate, decorate;
//!    produces pages lazily so emission can start early
//! 5. [`emit`]    — serialize pages to PDF syntax as they are produced;
//!    the only stage that touches the output sink

pub mod emit;
pub mod encode;
pub mod fonts;
pub mod layout;
pub mod resolve;
