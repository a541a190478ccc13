//! Host — token classification and line helpers for hosts-file text.
//!
//! Everything in here is pure: no I/O, no shared state. The parser and the
//! validator are both built on top of these functions.

pub mod idn;
pub mod ip;
pub mod line;
pub mod order;
pub mod rfc6125;

pub use idn::{
    is_compatible_idna2008, to_ascii_registration, transform_to_ascii, transform_to_unicode,
    ConversionError,
};
pub use ip::is_ip_address;
pub use line::{
    is_comment_line, trim_comment, trim_dns_by_level, trim_ip_address,
    trim_word_gaps, LineBreakError,
};
pub use order::LineOrder;
pub use rfc6125::is_compatible_rfc6125;

/// Comment delimiter.
pub const DELIM_COMMENT: char = '#';

/// DNS label delimiter.
pub const DELIM_DNS: char = '.';

/// Characters treated as white space when trimming lines.
pub const CUTSET: &[char] = &['\t', '\n', '\u{0B}', '\u{0C}', '\r', ' '];
