#![no_std]
//! Compile-time configuration shared by the command tree crates.
//!
//! Every value here is a plain `const` so it can size const-generic buffers
//! (`heapless::String<MAX_ARG_LEN>`) as well as runtime containers.

/// Default capacity, in bytes, of the scratch buffer every value token is
/// copied into before conversion. Longer tokens are rejected, strings included.
pub const MAX_ARG_LEN: usize = 64;

/// Number of slots the root command table starts with. The table doubles
/// every time it fills up.
pub const TABLE_INITIAL_CAPACITY: usize = 2;

/// Maximum length of one input line accepted by the interactive runner.
pub const INPUT_MAX_LEN: usize = 256;

/// Prompt printed by the interactive runner.
pub const PROMPT: &str = "cmd> ";

/// Delimiter between tokens of a runtime input line.
pub const TOKEN_DELIMITER: char = ' ';
