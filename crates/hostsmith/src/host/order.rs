use std::cmp::Ordering;

use super::DELIM_DNS;

/// Ordering applied to normalized lines when sorting is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrder {
    /// Plain byte-wise string order.
    Lexical,
    /// Dot-separated labels compared right to left, so hosts group by
    /// top-level domain first: `y.b.com` sorts before `x.a.jp`.
    ReverseDns,
}

impl LineOrder {
    /// Resolves the two sort flags. Reverse-DNS wins and implies sorting.
    pub fn from_flags(sort: bool, reverse_dns: bool) -> Option<Self> {
        if reverse_dns {
            Some(Self::ReverseDns)
        } else if sort {
            Some(Self::Lexical)
        } else {
            None
        }
    }

    #[inline]
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Lexical => a.cmp(b),
            Self::ReverseDns => a.rsplit(DELIM_DNS).cmp(b.rsplit(DELIM_DNS)),
        }
    }

    /// Stable in-memory sort.
    pub fn sort<S: AsRef<str>>(self, lines: &mut [S]) {
        lines.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(LineOrder::from_flags(false, false), None);
        assert_eq!(LineOrder::from_flags(true, false), Some(LineOrder::Lexical));
        assert_eq!(LineOrder::from_flags(false, true), Some(LineOrder::ReverseDns));
        assert_eq!(LineOrder::from_flags(true, true), Some(LineOrder::ReverseDns));
    }

    #[test]
    fn test_reverse_dns_grouping() {
        let mut lines = vec!["x.a.jp", "y.b.com"];
        LineOrder::ReverseDns.sort(&mut lines);
        assert_eq!(lines, vec!["y.b.com", "x.a.jp"]);

        let mut lines = vec!["one.example.co.jp", "three.example.com", "two.example.jp"];
        LineOrder::ReverseDns.sort(&mut lines);
        assert_eq!(
            lines,
            vec!["three.example.com", "one.example.co.jp", "two.example.jp"]
        );
    }

    #[test]
    fn test_reverse_dns_compares_labels_not_strings() {
        // "a-b" > "a" as labels; joined strings would compare "a-b.x" vs "a.x".
        assert_eq!(LineOrder::ReverseDns.compare("x.a", "x.a-b"), Ordering::Less);
        assert_eq!(LineOrder::ReverseDns.compare("sub.example.com", "example.com"), Ordering::Greater);
    }

    #[test]
    fn test_lexical_is_stable() {
        let mut lines = vec!["b", "a", "b", "a"];
        LineOrder::Lexical.sort(&mut lines);
        assert_eq!(lines, vec!["a", "a", "b", "b"]);
    }
}
