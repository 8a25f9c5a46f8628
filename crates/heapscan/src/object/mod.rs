//! Object Module - Tagged heap object model
//!
//! Bit-level decoding, object layouts, sizing, and symbol name views.

pub mod layout;
pub mod name;
pub mod size;
pub mod tag;

pub use name::{compare_ascii, CharSeq, NameEncoding, NameRef};
pub use size::{LayoutSizeOracle, ObjectSizeOracle};
pub use tag::{lowtag_of, widetag_of, LowTag, PointerTag, WideTag, Word, WORD_BYTES};
