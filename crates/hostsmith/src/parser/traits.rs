use super::model::ParsedLine;

pub trait LineNormalizer: Send + Sync {
    /// normalize one line of hosts-file text; `None` drops the line
    fn normalize(&self, line: &str) -> ParsedLine;
}

impl<N: LineNormalizer + ?Sized> LineNormalizer for std::sync::Arc<N> {
    fn normalize(&self, line: &str) -> ParsedLine {
        (**self).normalize(line)
    }
}
