//! spritepack - Library for packing images into self-describing sprite sheets
//!
//! This library provides functionality to:
//! - Slice source images into fixed-size tiles whose identity is written into
//!   a header row of pixels
//! - Compose tiles into one sheet and decompose a sheet back into tiles
//! - Reassemble the source images from decoded tiles alone
//! - Run both directions over files, configured through `spritepack.toml`

pub mod cli;
pub mod color;
pub mod config;
pub mod discovery;
pub mod format;
pub mod header;
pub mod identity;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod reassemble;
pub mod sheet;
pub mod slicer;
