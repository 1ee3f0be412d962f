use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::args::{InjectArgs, PipeArgs};
use crate::config::{RunConfig, SecurityConfig};
use crate::document::HtmlDocument;
use crate::errors::{ArbitraryCssError, Result};
use crate::manifest::{Manifest, ManifestBuilder};
use crate::processor::{apply_arbitrary_styles, Generation};
use crate::registry::UtilityRegistry;

/// Performance statistics
#[derive(Debug, Clone)]
pub struct PerformanceStats {
    pub total_duration: Duration,
    pub processing_duration: Duration,
    pub files_per_second: f64,
    pub bytes_processed: u64,
}

/// What happened to one document
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    /// Input path
    pub path: PathBuf,

    /// Generated stylesheet, `None` when no class matched
    pub generation: Option<Generation>,

    /// Where the document was (or, in a dry run, would have been) written
    pub output_path: Option<PathBuf>,
}

/// Result of the inject command
#[derive(Debug)]
pub struct InjectionResult {
    pub documents: Vec<DocumentOutcome>,
    pub manifest: Manifest,
    pub total_files_processed: usize,
    pub documents_styled: usize,
    pub total_rules: usize,
    pub performance_stats: Option<PerformanceStats>,
}

impl From<&InjectArgs> for RunConfig {
    fn from(args: &InjectArgs) -> Self {
        let security = SecurityConfig {
            allow_symlinks: args.allow_symlinks,
            max_file_size: args.max_file_size_mb.map(|mb| mb * 1024 * 1024),
            ..SecurityConfig::default()
        };

        Self {
            content: args.input.clone(),
            exclude: args.exclude.clone(),
            out_dir: args.out_dir.clone(),
            security,
        }
    }
}

/// Generate and install stylesheets for every matching document
pub async fn inject(args: InjectArgs) -> Result<InjectionResult> {
    let start_time = Instant::now();

    args.validate().map_err(ArbitraryCssError::InvalidInput)?;

    // Command line values are merged over the config file
    let config = match &args.config {
        Some(path) => RunConfig::from_file(path)?.merge(RunConfig::from(&args)),
        None => RunConfig::from(&args),
    };

    if config.content.is_empty() {
        return Err(ArbitraryCssError::InvalidInput(
            "No input patterns given on the command line or in the config file".to_string(),
        ));
    }

    if let Some(out_dir) = &config.out_dir {
        validate_output_path(out_dir, &config.security)?;
    }
    if let Some(manifest) = &args.manifest {
        validate_output_path(manifest, &config.security)?;
    }

    info!(
        patterns = ?config.content,
        out_dir = ?config.out_dir,
        max_file_size_mb = config.security.max_file_size() / (1024 * 1024),
        "starting arbitrary-value stylesheet generation"
    );

    let files = collect_files_with_security(&config.content, &config.exclude, &config.security)?;
    if files.is_empty() {
        return Err(ArbitraryCssError::NoFilesFound);
    }

    let bytes_processed: u64 = files.iter().map(|f| f.1).sum();
    info!(
        files = files.len(),
        megabytes = %format!("{:.2}", bytes_processed as f64 / (1024.0 * 1024.0)),
        "collected documents"
    );

    let progress_bar = if args.verbose {
        None
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({msg})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb.set_message("Generating stylesheets...");
        Some(pb)
    };

    let registry = UtilityRegistry::standard();
    let paths: Vec<PathBuf> = files.into_iter().map(|(path, _)| path).collect();

    let processing_start = Instant::now();
    let prepared = run_with_jobs(args.jobs, || {
        prepare_documents(&paths, &config, &registry, progress_bar.as_ref())
    })??;

    // Nothing is written unless every document was read and styled
    if !args.dry_run {
        run_with_jobs(args.jobs, || write_documents(&prepared))??;
    }
    let documents: Vec<DocumentOutcome> = prepared.into_iter().map(|p| p.outcome).collect();
    let processing_duration = processing_start.elapsed();

    let manifest = documents
        .iter()
        .fold(
            ManifestBuilder::new().with_files_processed(documents.len()),
            |builder, outcome| {
                builder.with_document(
                    outcome.path.display().to_string(),
                    outcome.generation.as_ref(),
                    outcome.output_path.as_ref().map(|p| p.display().to_string()),
                )
            },
        )
        .build();

    if let Some(manifest_path) = &args.manifest {
        if !args.dry_run {
            write_manifest(manifest_path, &manifest)?;
        }
    }

    let total_duration = start_time.elapsed();
    let stats = PerformanceStats {
        total_duration,
        processing_duration,
        files_per_second: documents.len() as f64 / total_duration.as_secs_f64().max(f64::EPSILON),
        bytes_processed,
    };

    if let Some(pb) = progress_bar {
        pb.finish_with_message(format!("✓ Complete ({:.1} files/sec)", stats.files_per_second));
    }

    let result = InjectionResult {
        total_files_processed: documents.len(),
        documents_styled: manifest.metadata.documents_styled,
        total_rules: manifest.totals.rules_emitted,
        documents,
        manifest,
        performance_stats: Some(stats.clone()),
    };

    info!(
        files = result.total_files_processed,
        styled = result.documents_styled,
        rules = result.total_rules,
        seconds = %format!("{:.2}", stats.total_duration.as_secs_f64()),
        files_per_second = %format!("{:.1}", stats.files_per_second),
        "generation complete"
    );

    Ok(result)
}

/// A styled document waiting to be written
struct PreparedDocument {
    outcome: DocumentOutcome,
    content: String,
}

/// Run `work` on a dedicated pool when a job count is given, else on the global one
fn run_with_jobs<T, F>(jobs: Option<usize>, work: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match jobs {
        Some(num_jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(num_jobs)
                .build()
                .map_err(|e| {
                    ArbitraryCssError::InvalidInput(format!(
                        "Cannot start {} jobs: {}",
                        num_jobs, e
                    ))
                })?;
            Ok(pool.install(work))
        }
        None => Ok(work()),
    }
}

/// Read and style every document in parallel without touching the disk
fn prepare_documents(
    paths: &[PathBuf],
    config: &RunConfig,
    registry: &UtilityRegistry,
    progress_bar: Option<&ProgressBar>,
) -> Result<Vec<PreparedDocument>> {
    let processed = AtomicUsize::new(0);

    paths
        .par_iter()
        .map(|path| {
            let prepared = prepare_document(path, config, registry);

            if let Some(pb) = progress_bar {
                let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
                pb.set_position(count as u64);
                pb.set_message(format!(
                    "Processing: {}",
                    path.file_name().unwrap_or_default().to_string_lossy()
                ));
            }

            prepared
        })
        .collect()
}

fn prepare_document(
    path: &Path,
    config: &RunConfig,
    registry: &UtilityRegistry,
) -> Result<PreparedDocument> {
    let source = fs::read_to_string(path).map_err(|e| ArbitraryCssError::ReadError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut document = HtmlDocument::new(source);
    let generation = apply_arbitrary_styles(&mut document, registry)?;

    let output_path = match (&generation, &config.out_dir) {
        (_, Some(out_dir)) => Some(output_target(path, out_dir, &config.security)),
        (Some(_), None) => Some(path.to_path_buf()),
        // Nothing to install and nowhere else to copy to
        (None, None) => None,
    };

    debug!(
        path = %path.display(),
        rules = generation.as_ref().map_or(0, |g| g.rules_emitted),
        output = ?output_path,
        "processed document"
    );

    Ok(PreparedDocument {
        outcome: DocumentOutcome {
            path: path.to_path_buf(),
            generation,
            output_path,
        },
        content: document.into_string(),
    })
}

fn write_documents(prepared: &[PreparedDocument]) -> Result<()> {
    prepared
        .par_iter()
        .filter_map(|doc| doc.outcome.output_path.as_ref().map(|target| (target, &doc.content)))
        .try_for_each(|(target, content)| write_document(target, content))
}

fn write_document(target: &Path, content: &str) -> Result<()> {
    let output_error = |e: std::io::Error| ArbitraryCssError::OutputError {
        path: target.display().to_string(),
        message: e.to_string(),
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(output_error)?;
    }
    write_atomic(target, content).map_err(output_error)
}

/// Location of a document under the output directory.
///
/// Paths inside the working directory keep their relative layout; anything
/// else is flattened to its file name.
fn output_target(path: &Path, out_dir: &Path, security: &SecurityConfig) -> PathBuf {
    let relative = if path.is_absolute() {
        path.strip_prefix(&security.working_directory).ok()
    } else {
        Some(path)
    };

    let relative = relative
        .filter(|rel| {
            rel.components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        })
        .map(Path::to_path_buf)
        .or_else(|| path.file_name().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("index.html"));

    out_dir.join(relative)
}

/// Validate that a path is safe (no path traversal)
fn validate_output_path(path: &Path, security: &SecurityConfig) -> Result<()> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let working_dir = security
        .working_directory
        .canonicalize()
        .unwrap_or_else(|_| security.working_directory.clone());

    let traverses = path.components().any(|c| matches!(c, Component::ParentDir));
    let escapes = !working_dir.join(&canonical).starts_with(&working_dir);
    if path.is_relative() && (traverses || escapes) {
        return Err(ArbitraryCssError::SecurityError(format!(
            "Output path '{}' appears to use path traversal",
            path.display()
        )));
    }

    Ok(())
}

/// Check if a file is safe to read
fn validate_input_file(path: &Path, security: &SecurityConfig) -> Result<()> {
    if !security.allow_symlinks && path.is_symlink() {
        return Err(ArbitraryCssError::SecurityError(format!(
            "Symbolic link not allowed: {}",
            path.display()
        )));
    }

    // If it's a symlink and we allow them, validate the target
    if security.allow_symlinks && path.is_symlink() {
        let target = path.canonicalize().map_err(|e| {
            ArbitraryCssError::SecurityError(format!(
                "Cannot resolve symlink target for '{}': {}",
                path.display(),
                e
            ))
        })?;

        let working_dir = security
            .working_directory
            .canonicalize()
            .unwrap_or_else(|_| security.working_directory.clone());

        if !target.starts_with(&working_dir) {
            return Err(ArbitraryCssError::SecurityError(format!(
                "Symlink target '{}' is outside working directory",
                target.display()
            )));
        }
    }

    let metadata = fs::metadata(path).map_err(|e| {
        ArbitraryCssError::SecurityError(format!(
            "Cannot read file metadata for '{}': {}",
            path.display(),
            e
        ))
    })?;

    let max_file_size = security.max_file_size();
    if metadata.len() > max_file_size {
        return Err(ArbitraryCssError::SecurityError(format!(
            "File '{}' exceeds maximum size limit ({} MB > {} MB)",
            path.display(),
            metadata.len() / (1024 * 1024),
            max_file_size / (1024 * 1024)
        )));
    }

    Ok(())
}

/// Collect files matching the given patterns with security checks
fn collect_files_with_security(
    patterns: &[String],
    exclude_patterns: &[String],
    security: &SecurityConfig,
) -> Result<Vec<(PathBuf, u64)>> {
    let excludes = exclude_patterns
        .iter()
        .map(|pattern| glob::Pattern::new(pattern))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut files = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped_count = 0;

    for pattern in patterns {
        for entry in glob::glob(pattern)? {
            let path = entry?;

            if excludes.iter().any(|exclude| exclude.matches_path(&path)) {
                continue;
            }

            // Directories are skipped, symlinks are judged by validate_input_file
            if path.is_dir() && !path.is_symlink() {
                continue;
            }

            if let Err(e) = validate_input_file(&path, security) {
                warn!("Skipping file - {}", e);
                skipped_count += 1;
                continue;
            }

            if path.is_dir() {
                continue;
            }

            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

            if seen.insert(path.clone()) {
                files.push((path, size));
            }
        }
    }

    if skipped_count > 0 {
        warn!("Skipped {} files due to security constraints", skipped_count);
    }

    Ok(files)
}

fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = manifest.to_pretty_json()?;
    write_atomic(path, &content).map_err(|e| ArbitraryCssError::OutputError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Write file atomically by writing to temp file then renaming
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    use std::io::Write;

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    let mut file = fs::File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Run the pipeline over one document held in memory.
///
/// Returns the stylesheet text, or the styled document when `inject` is set.
/// Without matches the result is empty, or the unchanged document when injecting.
pub fn pipe_document(input: &str, inject: bool, registry: &UtilityRegistry) -> Result<String> {
    let mut document = HtmlDocument::new(input);
    let generation = apply_arbitrary_styles(&mut document, registry)?;

    Ok(match (inject, generation) {
        (true, _) => document.into_string(),
        (false, Some(generation)) => generation.css,
        (false, None) => String::new(),
    })
}

/// Handle pipe command - read HTML from stdin, output CSS (or the styled document) to stdout
pub async fn handle_pipe_command(args: PipeArgs) -> Result<()> {
    use tokio::io::{self, AsyncReadExt, AsyncWriteExt};

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .await
        .map_err(|e| ArbitraryCssError::InputError(format!("Failed to read from stdin: {}", e)))?;

    if input.trim().is_empty() {
        return Ok(());
    }

    let output = pipe_document(&input, args.inject, &UtilityRegistry::standard())?;

    let stdout_error = |e: std::io::Error| ArbitraryCssError::OutputError {
        path: "stdout".to_string(),
        message: e.to_string(),
    };

    let mut stdout = io::stdout();
    stdout.write_all(output.as_bytes()).await.map_err(stdout_error)?;
    stdout.flush().await.map_err(stdout_error)?;

    Ok(())
}
