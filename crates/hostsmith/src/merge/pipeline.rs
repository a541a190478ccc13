//! Pipeline — normalize N files in parallel, concatenate, finalize.
//!
//! Stage 1 runs one blocking worker per input file, each writing its own
//! temp file. All workers are joined before any result is looked at, and the
//! error of the lowest-indexed failing input wins. Stage 2 concatenates the
//! parts in input order. Stage 3 either renames the combined file onto the
//! output or hands it to the external sorter.
//!
//! Every temp file is owned by a [`TempFiles`] and removed on both success
//! and failure.

use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::fs::FileOps;
use crate::host::LineOrder;
use crate::parser::{NormalizeMetrics, Normalizer};
use crate::transform::{panic_message, FileTransformer};

use super::sort::ExternalSorter;
use super::temp::{temp_prefix, TempFiles};
use super::{MergeError, MergeStage};

/// Summary of a successful merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub inputs: usize,
    pub lines_written: usize,
    pub sorted: bool,
    /// Temp files that could not be removed (already logged).
    pub cleanup_failures: usize,
}

pub struct MergePipeline {
    normalizer: Arc<Normalizer>,
    fs: Arc<dyn FileOps>,
    sorter: Arc<dyn ExternalSorter>,
    metrics: Arc<NormalizeMetrics>,
}

/// What one stage-1 worker hands back.
struct PartOutput {
    index: usize,
    temp: Option<PathBuf>,
    result: Result<usize, MergeError>,
}

impl MergePipeline {
    pub fn new(normalizer: Normalizer, fs: Arc<dyn FileOps>, sorter: Arc<dyn ExternalSorter>) -> Self {
        Self {
            normalizer: Arc::new(normalizer),
            fs,
            sorter,
            metrics: Arc::new(NormalizeMetrics::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<NormalizeMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<NormalizeMetrics> {
        &self.metrics
    }

    fn order(&self) -> Option<LineOrder> {
        self.normalizer.config().sort().order()
    }

    /// Normalizes `inputs`, concatenates them in list order and writes the
    /// result to `output`, sorted when the normalizer config asks for it.
    ///
    /// `output` is only ever replaced as a whole.
    pub async fn merge_sort_files(&self, inputs: &[PathBuf], output: &Path) -> Result<MergeReport, MergeError> {
        if inputs.is_empty() {
            return Err(MergeError::NoInputs);
        }

        let mut temps = TempFiles::new(Arc::clone(&self.fs));
        let result = self.run(inputs, output, &mut temps).await;
        let cleanup_failures = temps.remove_all();

        match result {
            Ok(mut report) => {
                report.cleanup_failures = cleanup_failures;
                tracing::info!(
                    "merged {} files into {} ({} lines, sorted: {})",
                    report.inputs,
                    output.display(),
                    report.lines_written,
                    report.sorted
                );
                Ok(report)
            }
            Err(e) => {
                tracing::debug!("merge failed, removed temp files ({} left behind)", cleanup_failures);
                Err(e)
            }
        }
    }

    async fn run(&self, inputs: &[PathBuf], output: &Path, temps: &mut TempFiles) -> Result<MergeReport, MergeError> {
        let (parts, lines_written) = self.normalize_all(inputs, temps).await?;
        tracing::info!("normalized {} files ({} lines kept)", parts.len(), lines_written);

        let combined = self.concatenate(parts, temps).await?;

        let order = self.order();
        match order {
            None => {
                self.fs.rename(&combined, output).map_err(|source| MergeError::Stage {
                    stage: MergeStage::Finalize,
                    source,
                })?;
                temps.release(&combined);
            }
            Some(order) => {
                tracing::info!("sorting {} lines ({:?})", lines_written, order);
                let fs = Arc::clone(&self.fs);
                let sorter = Arc::clone(&self.sorter);
                let output = output.to_path_buf();
                blocking(MergeStage::Sort, move || {
                    let compare = move |a: &str, b: &str| order.compare(a, b);
                    sorter.sort_file(&fs, &combined, &output, &compare)
                })
                .await?;
            }
        }

        Ok(MergeReport {
            inputs: inputs.len(),
            lines_written,
            sorted: order.is_some(),
            cleanup_failures: 0,
        })
    }

    /// Stage 1. Returns the part files in input order and the kept line total.
    async fn normalize_all(
        &self,
        inputs: &[PathBuf],
        temps: &mut TempFiles,
    ) -> Result<(Vec<PathBuf>, usize), MergeError> {
        let mut workers = JoinSet::new();
        for (index, input) in inputs.iter().enumerate() {
            let transformer = FileTransformer::new(Arc::clone(&self.normalizer), Arc::clone(&self.fs))
                .with_metrics(Arc::clone(&self.metrics));
            let fs = Arc::clone(&self.fs);
            let input = input.clone();
            workers.spawn_blocking(move || normalize_part(index, &transformer, fs.as_ref(), &input));
        }

        let mut parts: Vec<Option<PathBuf>> = vec![None; inputs.len()];
        let mut lines = 0;
        let mut first_error: Option<(usize, MergeError)> = None;

        while let Some(joined) = workers.join_next().await {
            let (index, result) = match joined {
                Ok(part) => {
                    if let Some(temp) = &part.temp {
                        temps.track(temp.clone());
                    }
                    if part.result.is_ok() {
                        parts[part.index] = part.temp;
                    }
                    (part.index, part.result)
                }
                Err(source) => (
                    usize::MAX,
                    Err(MergeError::Join {
                        stage: MergeStage::Normalize,
                        source,
                    }),
                ),
            };

            match result {
                Ok(count) => lines += count,
                Err(e) => {
                    if first_error.as_ref().map_or(true, |(first, _)| index < *first) {
                        first_error = Some((index, e));
                    }
                }
            }
        }

        if let Some((_, e)) = first_error {
            return Err(e);
        }
        Ok((parts.into_iter().flatten().collect(), lines))
    }

    /// Stage 2. Appends every part to one combined temp file, in order.
    async fn concatenate(&self, parts: Vec<PathBuf>, temps: &mut TempFiles) -> Result<PathBuf, MergeError> {
        let stage_err = |source| MergeError::Stage {
            stage: MergeStage::Concatenate,
            source,
        };
        let (combined, writer) = self
            .fs
            .create_temp(&temp_prefix(MergeStage::Concatenate))
            .map_err(stage_err)?;
        temps.track(combined.clone());

        let fs = Arc::clone(&self.fs);
        let bytes = blocking(MergeStage::Concatenate, move || {
            let mut writer = writer;
            let mut bytes = 0;
            for part in &parts {
                bytes += io::copy(&mut fs.open(part)?, &mut writer)?;
            }
            writer.flush()?;
            Ok(bytes)
        })
        .await?;

        tracing::debug!("concatenated {} bytes into {}", bytes, combined.display());
        Ok(combined)
    }
}

fn normalize_part(
    index: usize,
    transformer: &FileTransformer<Arc<Normalizer>>,
    fs: &dyn FileOps,
    input: &Path,
) -> PartOutput {
    let stage = MergeStage::Normalize;
    let (temp, mut writer) = match fs.create_temp(&temp_prefix(stage)) {
        Ok(created) => created,
        Err(source) => {
            return PartOutput {
                index,
                temp: None,
                result: Err(MergeError::Stage { stage, source }),
            }
        }
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        transformer.transform_file_to(input, writer.as_mut())
    }));
    drop(writer);

    let result = match outcome {
        Ok(Ok(lines)) => Ok(lines),
        Ok(Err(source)) => Err(MergeError::Transform {
            stage,
            path: input.to_path_buf(),
            source,
        }),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!("worker for {} panicked: {}", input.display(), message);
            Err(MergeError::WorkerPanicked { stage, message })
        }
    };

    PartOutput {
        index,
        temp: Some(temp),
        result,
    }
}

/// Runs blocking file work off the async runtime, mapping failures onto
/// `stage`.
async fn blocking<T, F>(stage: MergeStage, work: F) -> Result<T, MergeError>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(MergeError::Stage { stage, source }),
        Err(e) if e.is_panic() => {
            let message = panic_message(e.into_panic().as_ref());
            tracing::error!("{} worker panicked: {}", stage, message);
            Err(MergeError::WorkerPanicked { stage, message })
        }
        Err(source) => Err(MergeError::Join { stage, source }),
    }
}
