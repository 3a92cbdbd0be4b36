//! C8 + C9: target emission and top-level document assembly (spec §4.8,
//! §4.9).

pub mod document;
pub mod target;

pub use document::emit;
