//! IDN — Unicode / punycode transcoding and IDNA2008 compatibility.
//!
//! Two UTS-46 profiles are used:
//!
//! - **lookup** (`transform_to_ascii`, `transform_to_unicode`): maps input
//!   (case folding, width normalization) before encoding, applies STD3 ASCII
//!   rules and hyphen checks, but does not enforce DNS length limits.
//! - **registration** (`to_ascii_registration`): same rules plus DNS length
//!   verification, so empty labels and over-long names are rejected.
//!
//! A host is IDNA2008 compatible when the registration profile leaves it
//! byte-identical, i.e. it already is canonical ASCII/punycode.

use idna::uts46::{AsciiDenyList, DnsLength, Hyphens, Uts46};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to convert host name {host:?} to ASCII: {source}")]
    ToAscii {
        host: String,
        #[source]
        source: idna::Errors,
    },

    #[error("failed to convert host name {host:?} to Unicode: {source}")]
    ToUnicode {
        host: String,
        #[source]
        source: idna::Errors,
    },
}

/// Converts a Unicode host name to its ASCII/punycode form.
///
/// `www.GÖPHER.com` becomes `www.xn--gpher-jua.com`.
pub fn transform_to_ascii(host: &str) -> Result<String, ConversionError> {
    Uts46::new()
        .to_ascii(host.as_bytes(), AsciiDenyList::STD3, Hyphens::Check, DnsLength::Ignore)
        .map(|ascii| ascii.into_owned())
        .map_err(|source| ConversionError::ToAscii {
            host: host.to_string(),
            source,
        })
}

/// Converts a punycoded host name back to Unicode. Opposite of
/// [`transform_to_ascii`].
pub fn transform_to_unicode(host: &str) -> Result<String, ConversionError> {
    let (unicode, result) =
        Uts46::new().to_unicode(host.as_bytes(), AsciiDenyList::STD3, Hyphens::Check);

    result
        .map(|()| unicode.into_owned())
        .map_err(|source| ConversionError::ToUnicode {
            host: host.to_string(),
            source,
        })
}

/// Transcodes `host` with the registration profile.
pub fn to_ascii_registration(host: &str) -> Result<String, ConversionError> {
    Uts46::new()
        .to_ascii(host.as_bytes(), AsciiDenyList::STD3, Hyphens::Check, DnsLength::Verify)
        .map(|ascii| ascii.into_owned())
        .map_err(|source| ConversionError::ToAscii {
            host: host.to_string(),
            source,
        })
}

/// Returns true if `host` is already in canonical IDNA2008 ASCII form.
///
/// Raw Unicode, upper case letters, underscores and empty labels all make
/// this false. Use [`transform_to_ascii`] first to canonicalize.
pub fn is_compatible_idna2008(host: &str) -> bool {
    matches!(to_ascii_registration(host), Ok(ascii) if ascii == host)
}
