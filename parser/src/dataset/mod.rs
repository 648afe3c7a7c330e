//! Reading and writing of whole data sets.
//!
//! Both directions work on in-memory buffers.
//! The file meta group and the Part 10 preamble
//! are handled one level above, by the object crate.

pub mod read;
pub mod write;
