//! CLI — flags, input resolution and the two run modes (merge, validate).

use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser};
use serde::Serialize;
use tracing::{error, info};

use crate::conf::AppConfig;
use crate::fs::{FileOps, OsFs};
use crate::merge::{ChunkedSorter, MergePipeline, MergeReport};
use crate::parser::{MetricsSnapshot, NormalizeMetrics, Normalizer};
use crate::search::{self, DEFAULT_PATTERN};
use crate::validator::Validator;

/// Merge multiple hosts file(s) into one but parse and sort them.
#[derive(Debug, Parser)]
#[command(name = "hostsmith", version)]
#[command(about = "Merge multiple hosts file(s) into one but parse and sort them")]
pub struct Cli {
    /// Files to merge, or the search pattern when --dir is given
    pub args: Vec<String>,

    /// Directory to search for hosts files
    #[arg(short = 'd', long = "dir")]
    pub dir: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,

    /// Config file (default: $HOSTSMITH_CONFIG_FILE or ./hostsmith.toml)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Convert unicode host names to ASCII/punycode
    #[arg(short = 'p', long = "punycode", action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub punycode: Option<bool>,

    /// Remove comments from the output
    #[arg(short = 'c', long = "remove-comment", action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub remove_comment: Option<bool>,

    /// Remove empty lines from the output
    #[arg(short = 'e', long = "remove-emptyline", action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub remove_emptyline: Option<bool>,

    /// Remove leading IP addresses from each line
    #[arg(long = "remove-ip-head", action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub remove_ip_head: Option<bool>,

    /// Remove leading white space from each line
    #[arg(long = "remove-space-head", action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub remove_space_head: Option<bool>,

    /// Remove trailing white space from each line
    #[arg(long = "remove-space-tail", action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub remove_space_tail: Option<bool>,

    /// Sort the output by host name
    #[arg(short = 's', long = "sorthost", action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub sorthost: Option<bool>,

    /// Sort the output by reversed DNS labels, e.g. 'com.example.www'
    #[arg(short = 'l', long = "sortlabel", action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub sortlabel: Option<bool>,

    /// IP address to put in front of every host line (e.g. a sinkhole)
    #[arg(short = 'i', long = "use-ip")]
    pub use_ip: Option<String>,

    /// Validate the files instead of merging them
    #[arg(long)]
    pub validate: bool,

    /// Print run statistics as JSON to stderr
    #[arg(long)]
    pub stats: bool,
}

#[derive(Serialize)]
struct RunStats<'a> {
    report: &'a MergeReport,
    metrics: MetricsSnapshot,
}

impl Cli {
    /// Overlay the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        let n = &mut config.normalize;
        let flags = [
            (self.punycode, &mut n.idna_compatible_out),
            (self.remove_comment, &mut n.trim_comment),
            (self.remove_emptyline, &mut n.omit_empty_line),
            (self.remove_ip_head, &mut n.trim_leading_ip),
            (self.remove_space_head, &mut n.trim_leading_space),
            (self.remove_space_tail, &mut n.trim_trailing_space),
            (self.sorthost, &mut n.sort_after_parse),
            (self.sortlabel, &mut n.sort_as_reverse_dns),
        ];
        for (flag, field) in flags {
            if let Some(value) = flag {
                *field = value;
            }
        }

        if let Some(ip) = &self.use_ip {
            n.replacement_ip = ip.clone();
        }
    }

    /// The files to work on: the positional paths, or the search results
    /// under `--dir` (first positional is then the pattern).
    pub fn inputs(&self) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        if let Some(dir) = &self.dir {
            let pattern = self.args.first().map(String::as_str).unwrap_or(DEFAULT_PATTERN);
            return Ok(search::find_files(pattern, dir)?);
        }
        if self.args.is_empty() {
            return Err("no file path(s) given".into());
        }
        Ok(self.args.iter().map(PathBuf::from).collect())
    }
}

pub async fn run(cli: &Cli, config: AppConfig) -> Result<(), Box<dyn Error>> {
    let inputs = cli.inputs()?;
    let fs: Arc<dyn FileOps> = Arc::new(OsFs::new(config.temp_dir.clone()));
    if let Some(missing) = inputs.iter().find(|path| !fs.is_file(path)) {
        return Err(format!("file not found: {}", missing.display()).into());
    }

    if cli.validate {
        return validate(&inputs, fs.as_ref(), &config);
    }

    let metrics = Arc::new(NormalizeMetrics::new());
    let pipeline = MergePipeline::new(
        Normalizer::new(config.normalize.clone()),
        Arc::clone(&fs),
        Arc::new(ChunkedSorter::new(config.sort_chunk_bytes)),
    )
    .with_metrics(Arc::clone(&metrics));

    let report = match &cli.out {
        Some(out) => {
            let report = pipeline.merge_sort_files(&inputs, out).await?;
            println!("Output file: {}", out.display());
            report
        }
        None => {
            let temp_dir = config.temp_dir.clone().unwrap_or_else(std::env::temp_dir);
            let temp = tempfile::Builder::new()
                .prefix("hostsmith-")
                .tempfile_in(temp_dir)?
                .into_temp_path();
            let report = pipeline.merge_sort_files(&inputs, &temp).await?;
            io::copy(&mut File::open(&temp)?, &mut io::stdout().lock())?;
            temp.close()?;
            report
        }
    };

    let snapshot = metrics.snapshot();
    info!(
        "{} lines scanned, {} kept, {} dropped",
        snapshot.lines_scanned, snapshot.lines_kept, snapshot.lines_dropped
    );
    if cli.stats {
        let stats = RunStats {
            report: &report,
            metrics: snapshot,
        };
        eprintln!("{}", serde_json::to_string_pretty(&stats)?);
    }
    Ok(())
}

fn validate(inputs: &[PathBuf], fs: &dyn FileOps, config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let validator = Validator::new(config.validate.clone());
    let mut invalid = 0;

    for path in inputs {
        match validator.validate_file(fs, path) {
            Ok(()) => info!("{}: valid", path.display()),
            Err(e) => {
                error!("{}: {}", path.display(), e);
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        return Err(format!("{} of {} files failed validation", invalid, inputs.len()).into());
    }
    Ok(())
}
