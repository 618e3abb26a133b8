//! # basic64
//!
//! An interpreter for the BASIC dialect shipped with the Commodore 64
//! (Microsoft BASIC V2), with a terminal-hosted emulation of the 40×25
//! text screen.
//! ```text
//!     **** COMMODORE 64 BASIC V2 ****
//! READY.
//! █
//! ```
//!
//! The pipeline: raw bytes → [`prg`] (or an identity pass for plain
//! text) → canonical source → [`lang`] → program tree → [`mach`] →
//! screen buffer → [`term`].

pub mod lang;
pub mod mach;
pub mod prg;
pub mod term;
