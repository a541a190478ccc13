//! Chunked sorter — in-memory sort runs plus a stable k-way merge.

use std::io::{self, BufRead, BufReader, Lines, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::conf::DEFAULT_SORT_CHUNK_BYTES;
use crate::fs::FileOps;

use super::sort::{Compare, ExternalSorter};
use super::temp::{temp_prefix, TempFiles};
use super::MergeStage;

/// Sorts up to `chunk_bytes` of lines in memory at a time. Inputs that fit
/// in one chunk never touch disk except for the final output.
#[derive(Debug, Clone)]
pub struct ChunkedSorter {
    chunk_bytes: usize,
}

impl ChunkedSorter {
    pub fn new(chunk_bytes: usize) -> Self {
        Self {
            chunk_bytes: chunk_bytes.max(1),
        }
    }
}

impl Default for ChunkedSorter {
    fn default() -> Self {
        Self::new(DEFAULT_SORT_CHUNK_BYTES)
    }
}

type RunReader = Lines<BufReader<Box<dyn Read + Send>>>;

impl ExternalSorter for ChunkedSorter {
    fn sort_file(
        &self,
        fs: &Arc<dyn FileOps>,
        input: &Path,
        output: &Path,
        compare: Compare<'_>,
    ) -> io::Result<()> {
        let mut temps = TempFiles::new(Arc::clone(fs));
        let mut runs = Vec::new();
        let mut chunk = Vec::new();
        let mut chunk_size = 0;

        for line in BufReader::new(fs.open(input)?).lines() {
            let line = line?;
            chunk_size += line.len() + 1;
            chunk.push(line);
            if chunk_size >= self.chunk_bytes {
                runs.push(write_run(fs, &mut temps, &mut chunk, compare)?);
                chunk_size = 0;
            }
        }

        let (sorted, writer) = fs.create_temp(&temp_prefix(MergeStage::Sort))?;
        temps.track(sorted.clone());

        if runs.is_empty() {
            chunk.sort_by(|a, b| compare(a, b));
            write_lines(writer, chunk.iter().map(String::as_str))?;
        } else {
            if !chunk.is_empty() {
                runs.push(write_run(fs, &mut temps, &mut chunk, compare)?);
            }
            tracing::debug!("merging {} sort runs of {}", runs.len(), input.display());
            merge_runs(fs, &runs, writer, compare)?;
        }

        fs.rename(&sorted, output)?;
        temps.release(&sorted);
        temps.remove_all();
        Ok(())
    }
}

/// Sorts `chunk` and spills it to a new run file, leaving `chunk` empty.
fn write_run(
    fs: &Arc<dyn FileOps>,
    temps: &mut TempFiles,
    chunk: &mut Vec<String>,
    compare: Compare<'_>,
) -> io::Result<PathBuf> {
    chunk.sort_by(|a, b| compare(a, b));

    let (path, writer) = fs.create_temp(&temp_prefix(MergeStage::Sort))?;
    temps.track(path.clone());
    write_lines(writer, chunk.drain(..))?;
    Ok(path)
}

fn write_lines<I, S>(mut writer: Box<dyn Write + Send>, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        writer.write_all(line.as_ref().as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Merges sorted runs. Equal lines are taken from the earliest run first,
/// which keeps the overall sort stable.
fn merge_runs(
    fs: &Arc<dyn FileOps>,
    runs: &[PathBuf],
    mut writer: Box<dyn Write + Send>,
    compare: Compare<'_>,
) -> io::Result<()> {
    let mut readers: Vec<RunReader> = runs
        .iter()
        .map(|run| fs.open(run).map(|r| BufReader::new(r).lines()))
        .collect::<io::Result<_>>()?;

    let mut heads: Vec<Option<String>> = readers
        .iter_mut()
        .map(|r| r.next().transpose())
        .collect::<io::Result<_>>()?;

    loop {
        let mut best: Option<usize> = None;
        for (i, head) in heads.iter().enumerate() {
            let Some(line) = head else { continue };
            let better = match best.and_then(|b| heads[b].as_deref()) {
                Some(current) => compare(line.as_str(), current).is_lt(),
                None => true,
            };
            if better {
                best = Some(i);
            }
        }

        let Some(i) = best else { break };
        if let Some(line) = heads[i].take() {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        heads[i] = readers[i].next().transpose()?;
    }

    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FakeFs;
    use crate::host::LineOrder;
    use std::cmp::Ordering;

    fn sort_with(sorter: &ChunkedSorter, input: &str, order: LineOrder) -> (FakeFs, String) {
        let fake = FakeFs::new();
        fake.add_file("/in", input);
        let fs: Arc<dyn FileOps> = Arc::new(fake.clone());

        let compare = move |a: &str, b: &str| order.compare(a, b);
        sorter
            .sort_file(&fs, Path::new("/in"), Path::new("/out"), &compare)
            .unwrap();
        let out = fake.read_to_string("/out").unwrap();
        (fake, out)
    }

    #[test]
    fn test_sorts_in_memory() {
        let (fs, out) = sort_with(&ChunkedSorter::default(), "c\na\nb\n", LineOrder::Lexical);
        assert_eq!(out, "a\nb\nc\n");
        assert_eq!(fs.paths(), vec![PathBuf::from("/in"), PathBuf::from("/out")]);
    }

    #[test]
    fn test_sorts_with_runs_and_cleans_up() {
        let input: String = (0..200).rev().map(|i| format!("host{i:03}.example.com\n")).collect();
        let expected: String = (0..200).map(|i| format!("host{i:03}.example.com\n")).collect();

        let (fs, out) = sort_with(&ChunkedSorter::new(100), &input, LineOrder::Lexical);
        assert_eq!(out, expected);
        assert_eq!(fs.paths(), vec![PathBuf::from("/in"), PathBuf::from("/out")]);
    }

    #[test]
    fn test_reverse_dns_across_runs() {
        let input = "x.a.jp\ny.b.com\nz.a.jp\nw.c.com\n";
        let (_, out) = sort_with(&ChunkedSorter::new(8), input, LineOrder::ReverseDns);
        assert_eq!(out, "y.b.com\nw.c.com\nx.a.jp\nz.a.jp\n");
    }

    #[test]
    fn test_merge_is_stable() {
        // Compare on the first character only; the tag after it must keep
        // input order among equals.
        let fake = FakeFs::new();
        fake.add_file("/in", "b1\na1\nb2\na2\nb3\na3\n");
        let fs: Arc<dyn FileOps> = Arc::new(fake.clone());
        let first_char = |a: &str, b: &str| -> Ordering { a[..1].cmp(&b[..1]) };

        ChunkedSorter::new(6)
            .sort_file(&fs, Path::new("/in"), Path::new("/out"), &first_char)
            .unwrap();
        assert_eq!(fake.read_to_string("/out").unwrap(), "a1\na2\na3\nb1\nb2\nb3\n");
    }

    #[test]
    fn test_empty_input() {
        let (_, out) = sort_with(&ChunkedSorter::new(1), "", LineOrder::Lexical);
        assert_eq!(out, "");
    }

    #[test]
    fn test_rename_failure_leaves_no_files() {
        let fake = FakeFs::new();
        fake.add_file("/in", "b\na\n");
        fake.fail_rename(true);
        let fs: Arc<dyn FileOps> = Arc::new(fake.clone());

        let compare = |a: &str, b: &str| a.cmp(b);
        let result = ChunkedSorter::new(2).sort_file(&fs, Path::new("/in"), Path::new("/out"), &compare);

        assert!(result.is_err());
        assert_eq!(fake.paths(), vec![PathBuf::from("/in")]);
    }
}
