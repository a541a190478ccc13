//! Normalizer — the configurable per-line transform.
//!
//! Steps always run in this order, each one gated by its config flag:
//!
//! 1. trim leading / trailing white space
//! 2. strip the trailing comment
//! 3. strip leading IP addresses
//! 4. convert chunks to IDNA2008 ASCII, dropping the ones that can't be
//! 5. omit the line if nothing is left
//! 6. prepend the replacement IP unless the line already leads with one

use std::borrow::Cow;

use crate::conf::NormalizationConfig;
use crate::host::{self, line, CUTSET};

use super::model::ParsedLine;
use super::traits::LineNormalizer;

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizationConfig,
}

impl Normalizer {
    pub fn new(config: NormalizationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    /// Normalizes a whole document.
    ///
    /// Lines are split on `\n`, omitted lines are removed, and the result is
    /// sorted in memory when sorting is configured.
    pub fn normalize_text(&self, input: &str) -> String {
        let mut lines: Vec<String> = input
            .split('\n')
            .filter_map(|line| self.normalize(line))
            .collect();

        if let Some(order) = self.config.sort().order() {
            order.sort(&mut lines);
        }

        lines.join("\n")
    }

    fn trim_space<'a>(&self, line: &'a str) -> &'a str {
        let mut line = line;
        if self.config.trim_leading_space {
            line = line.trim_start_matches(CUTSET);
        }
        if self.config.trim_trailing_space {
            line = line.trim_end_matches(CUTSET);
        }
        line
    }

    fn to_idna_chunks(line: &str) -> String {
        let hosts: Vec<String> = line::chunks(line)
            .filter_map(|chunk| host::transform_to_ascii(chunk).ok())
            .filter(|ascii| host::is_compatible_idna2008(ascii))
            .collect();
        line::join_with_ip("", &hosts)
    }

    /// Lines that already lead with an IP (only possible with
    /// `trim_leading_ip` off) keep it and get no second one.
    fn prepend_ip(&self, line: &str) -> Option<String> {
        let ip = self.config.replacement_ip.as_str();
        let first = line::chunks(line).next()?;
        if ip.is_empty() || host::is_comment_line(line) || host::is_ip_address(first) {
            return None;
        }
        Some(format!("{} {}", ip, line))
    }
}

impl LineNormalizer for Normalizer {
    fn normalize(&self, line: &str) -> ParsedLine {
        let mut text: Cow<'_, str> = Cow::Borrowed(self.trim_space(line));

        if self.config.trim_comment {
            // A line feed inside one line can't be split safely; drop it all.
            let stripped = host::trim_comment(text.trim_start_matches(CUTSET)).unwrap_or_default();
            text = Cow::Owned(stripped.to_string());
        }

        if self.config.trim_leading_ip && !host::is_comment_line(&text) {
            text = Cow::Owned(host::trim_ip_address(&text));
        }

        if self.config.idna_compatible_out && !host::is_comment_line(&text) {
            text = Cow::Owned(Self::to_idna_chunks(&text));
        }

        if self.config.omit_empty_line && text.trim_matches(CUTSET).is_empty() {
            return None;
        }

        match self.prepend_ip(&text) {
            Some(prefixed) => Some(prefixed),
            None => Some(text.into_owned()),
        }
    }
}
