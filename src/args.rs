use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Arbitrary-value CSS CLI - Generates stylesheets for classes like `w-[320px]` and `mt-[10px]@md`
#[derive(Parser, Debug)]
#[command(name = "arbitrary-css-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and install stylesheets into HTML documents
    Inject(InjectArgs),
    /// Read one HTML document from stdin and write the result to stdout
    Pipe(PipeArgs),
}

/// Arguments for the inject command
#[derive(Parser, Debug, Clone, Default)]
pub struct InjectArgs {
    /// Input file patterns (glob patterns supported)
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATTERN",
        num_args = 1..,
        help = "HTML documents to scan for arbitrary-value classes"
    )]
    pub input: Vec<String>,

    /// Exclude patterns (glob patterns to exclude)
    #[arg(
        short = 'e',
        long = "exclude",
        value_name = "PATTERN",
        num_args = 0..,
        help = "Patterns to exclude from scanning"
    )]
    pub exclude: Vec<String>,

    /// Configuration file path (YAML or JSON)
    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        help = "Path to configuration file (YAML or JSON format)"
    )]
    pub config: Option<PathBuf>,

    /// Output directory
    #[arg(
        short = 'o',
        long = "out-dir",
        value_name = "DIR",
        help = "Write styled documents here instead of rewriting them in place"
    )]
    pub out_dir: Option<PathBuf>,

    /// Manifest file path (JSON)
    #[arg(
        short = 'm',
        long = "manifest",
        value_name = "PATH",
        help = "Path where a JSON report of the run will be written"
    )]
    pub manifest: Option<PathBuf>,

    /// Verbose output
    #[arg(
        short = 'v',
        long = "verbose",
        default_value_t = false,
        help = "Enable verbose output"
    )]
    pub verbose: bool,

    /// Number of parallel threads to use
    #[arg(
        short = 'j',
        long = "jobs",
        value_name = "NUM",
        help = "Number of parallel threads to use (defaults to number of CPU cores)"
    )]
    pub jobs: Option<usize>,

    /// Dry run (don't write output files)
    #[arg(
        long = "dry-run",
        default_value_t = false,
        help = "Generate stylesheets but don't write any files"
    )]
    pub dry_run: bool,

    /// Follow symbolic links inside the working directory
    #[arg(
        long = "allow-symlinks",
        default_value_t = false,
        help = "Accept symbolic links whose target stays inside the working directory"
    )]
    pub allow_symlinks: bool,

    /// Maximum input file size in megabytes
    #[arg(
        long = "max-file-size",
        value_name = "MB",
        help = "Skip documents larger than this many megabytes (default: 10)"
    )]
    pub max_file_size_mb: Option<u64>,
}

/// Arguments for the pipe command
#[derive(Parser, Debug, Clone, Default)]
pub struct PipeArgs {
    /// Output the styled document instead of the stylesheet
    #[arg(
        long = "inject",
        default_value_t = false,
        help = "Write the document with the stylesheet installed instead of the bare CSS"
    )]
    pub inject: bool,
}

impl InjectArgs {
    /// Validate that the arguments are consistent
    pub fn validate(&self) -> Result<(), String> {
        // Patterns may come from the config file instead
        if self.input.is_empty() && self.config.is_none() {
            return Err("At least one input pattern or a config file must be provided".to_string());
        }

        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                return Err("Number of jobs must be at least 1".to_string());
            }
        }

        if self.max_file_size_mb == Some(0) {
            return Err("Maximum file size must be at least 1 MB".to_string());
        }

        if let (Some(manifest), Some(out_dir)) = (&self.manifest, &self.out_dir) {
            if manifest == out_dir {
                return Err("Manifest path and output directory must be different".to_string());
            }
        }

        Ok(())
    }
}
