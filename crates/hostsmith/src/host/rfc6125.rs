use super::DELIM_DNS;

/// Returns true if `host` can be matched (or matched against) according to
/// RFC 6125 §2.2, with some leniency for legacy deployments.
///
/// With `allow_wildcard`, a full left-most `*` label is accepted. Without it,
/// one trailing `.` is ignored.
pub fn is_compatible_rfc6125(host: &str, allow_wildcard: bool) -> bool {
    let host = if allow_wildcard {
        host
    } else {
        host.strip_suffix(DELIM_DNS).unwrap_or(host)
    };

    if host.is_empty() {
        return false;
    }

    host.split(DELIM_DNS).enumerate().all(|(index, label)| {
        if label.is_empty() {
            return false;
        }
        // Only a full left-most wildcard; a literal '*' elsewhere never matches.
        if allow_wildcard && index == 0 && label == "*" {
            return true;
        }
        is_valid_label(label)
    })
}

fn is_valid_label(label: &str) -> bool {
    label.char_indices().all(|(pos, ch)| {
        ch.is_ascii_alphanumeric()
            || (ch == '-' && pos != 0)
            // Not valid in host names, but common outside the WebPKI.
            || ch == '_'
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc6125_hosts() {
        let cases = [
            ("example.com", true),
            ("example.com.", true),
            ("sub.example.com", true),
            ("my_host.example.com", true),
            ("Example-123.COM", true),
            ("-example.com", false),
            ("-eXample123-.com", false),
            ("example..com", false),
            ("", false),
            (".", false),
            ("*.example.com", false),
            ("göpher.com", false),
            ("exa mple.com", false),
        ];

        for (input, expect) in cases {
            assert_eq!(is_compatible_rfc6125(input, false), expect, "input: {input:?}");
        }
    }

    #[test]
    fn test_rfc6125_patterns() {
        let cases = [
            ("*.example.com", true),
            ("example.com", true),
            ("*", true),
            ("www.*.com", false),
            ("*foo.example.com", false),
            // Trailing dot is only tolerated for plain hosts.
            ("example.com.", false),
        ];

        for (input, expect) in cases {
            assert_eq!(is_compatible_rfc6125(input, true), expect, "input: {input:?}");
        }
    }
}
