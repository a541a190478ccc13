use std::cmp::Ordering;
use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::fs::FileOps;

/// Line comparator handed to an [`ExternalSorter`].
pub type Compare<'a> = &'a (dyn Fn(&str, &str) -> Ordering + Sync);

/// Sorts the lines of a file that may not fit in memory.
///
/// Contract: the sort is stable under `compare`, `output` is written
/// atomically (it never exists half-written), and no intermediate copy of
/// the input is left behind when the call returns.
pub trait ExternalSorter: Send + Sync {
    fn sort_file(
        &self,
        fs: &Arc<dyn FileOps>,
        input: &Path,
        output: &Path,
        compare: Compare<'_>,
    ) -> io::Result<()>;
}
