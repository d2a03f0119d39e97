use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use pdf_diploma::transparency::encode_png;
use pdf_diploma::{
    Color, DiplomaRow, LayoutConfig, SignatureOutcome, Template, build_overlay, compose,
    constants::{DEFAULT_BG_THRESHOLD, DEFAULT_RECOLOR_THRESHOLD},
    make_background_transparent, recolor_ink,
};
use pdf_diploma_batch::source::DEFAULT_API_KEY_HEADER;
use pdf_diploma_batch::{
    AdminApiConfig, AdminApiReporter, AdminApiSource, AssetSource, BatchCache, BatchJob,
    BatchOptions, BatchReport, LocalSource, LogReporter, StatusReporter, process_event, run_batch,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "diplomas", about = "Diploma batch generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every diploma in a roster CSV
    Batch {
        /// Roster CSV path or URL (columns: nombre, curso, fecha, profesor)
        #[arg(long)]
        csv: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Directory for work folders and archives
        #[arg(short, long)]
        output: PathBuf,

        /// Batch id used in status reports
        #[arg(long, default_value = "local")]
        batch_id: String,
    },

    /// Process a queue event file ({"Records":[{"body":"<job json>"}]})
    Event {
        /// Event JSON file
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        /// Directory for work folders and archives
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Compose a single diploma
    Compose {
        /// Template PDF (first page is used)
        #[arg(long)]
        template: PathBuf,

        /// Layout JSON
        #[arg(long)]
        layout: PathBuf,

        #[arg(long)]
        nombre: String,

        #[arg(long)]
        curso: String,

        #[arg(long)]
        fecha: String,

        #[arg(long)]
        profesor: String,

        /// Signature image
        #[arg(long)]
        signature: Option<PathBuf>,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Write only the overlay page, without the template underneath
        #[arg(long)]
        overlay_only: bool,
    },

    /// Remove the background of a signature image
    Signature {
        /// Input image (PNG, JPEG, GIF, WebP)
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        /// Pixels with every channel at or above this become transparent
        #[arg(long, default_value_t = DEFAULT_BG_THRESHOLD)]
        threshold: u8,

        /// Repaint the remaining ink with this color (#RGB or #RRGGBB)
        #[arg(long)]
        recolor: Option<String>,

        /// Pixels with every channel below this count as ink
        #[arg(long, default_value_t = DEFAULT_RECOLOR_THRESHOLD)]
        recolor_threshold: u8,
    },
}

/// Where layout, template and signatures come from
#[derive(Args)]
struct SourceArgs {
    /// Local assets directory (layout.json, template.pdf, signatures/)
    #[arg(long, conflicts_with = "admin_base")]
    assets_dir: Option<PathBuf>,

    /// Admin API base URL
    #[arg(long, env = "DIPLOMAS_ADMIN_BASE")]
    admin_base: Option<String>,

    /// Admin API key
    #[arg(long, env = "DIPLOMAS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Header carrying the admin API key
    #[arg(long, default_value = DEFAULT_API_KEY_HEADER)]
    api_key_header: String,
}

enum Source {
    Local(LocalSource),
    Admin(AdminApiSource),
}

impl SourceArgs {
    fn build(self) -> Result<Source> {
        if let Some(dir) = self.assets_dir {
            return Ok(Source::Local(LocalSource::new(dir)));
        }
        let Some(base) = self.admin_base else {
            bail!("either --assets-dir or --admin-base is required");
        };
        let mut config = AdminApiConfig::new(base);
        if let Some(key) = self.api_key {
            config = config.with_api_key(self.api_key_header, key);
        }
        Ok(Source::Admin(AdminApiSource::new(config)?))
    }
}

/// What to run once the source is known
enum Work {
    Job(BatchJob),
    Event(Vec<u8>),
}

async fn run_work<S, R>(work: Work, source: &S, reporter: &R, output: PathBuf) -> Result<Vec<BatchReport>>
where
    S: AssetSource,
    R: StatusReporter,
{
    let cache = BatchCache::new();
    let options = BatchOptions::new(output);
    let reports = match work {
        Work::Job(job) => vec![run_batch(&job, source, reporter, &cache, &options).await?],
        Work::Event(bytes) => process_event(&bytes, source, reporter, &cache, &options).await?,
    };
    Ok(reports)
}

async fn dispatch(work: Work, source: SourceArgs, output: PathBuf) -> Result<Vec<BatchReport>> {
    match source.build()? {
        Source::Local(local) => run_work(work, &local, &LogReporter, output).await,
        Source::Admin(api) => {
            let reporter = AdminApiReporter::new(api.clone());
            run_work(work, &api, &reporter, output).await
        }
    }
}

/// Local roster paths are canonicalized so their parent folder is a real
/// directory name, never `.` or `..`
async fn roster_location(csv: &str) -> Result<String> {
    if csv.contains("://") {
        return Ok(csv.to_string());
    }
    let canonical = tokio::fs::canonicalize(csv)
        .await
        .with_context(|| format!("Cannot resolve roster path {}", csv))?;
    Ok(canonical.to_string_lossy().into_owned())
}

fn print_reports(reports: &[BatchReport]) {
    for report in reports {
        println!("Batch {} ({}):", report.batch_id, report.status);
        println!("  Records: {}", report.total_records);
        println!("  Generated: {}", report.generated.len());
        println!("  Row errors: {}", report.row_errors);
        println!("  Manifest: {}", report.manifest.display());
        println!("  Archive: {}", report.archive.display());
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Use RUST_LOG if set, otherwise default to info level for our crates
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("diploma_cli=info,pdf_diploma=info,pdf_diploma_batch=info")
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Batch {
            csv,
            source,
            output,
            batch_id,
        } => {
            let job = BatchJob::new(batch_id, roster_location(&csv).await?);
            let reports = dispatch(Work::Job(job), source, output).await?;
            print_reports(&reports);
        }

        Commands::Event {
            file,
            source,
            output,
        } => {
            let bytes = read_file(&file).await?;
            let reports = dispatch(Work::Event(bytes), source, output).await?;
            print_reports(&reports);
        }

        Commands::Compose {
            template,
            layout,
            nombre,
            curso,
            fecha,
            profesor,
            signature,
            output,
            overlay_only,
        } => {
            let template = Template::load(&template).await?;
            let layout = LayoutConfig::load(&layout).await?;
            let signature = match &signature {
                Some(path) => Some(read_file(path).await?),
                None => None,
            };
            let row = DiplomaRow::new(nombre, curso, fecha, profesor);

            let (bytes, outcome) = tokio::task::spawn_blocking(move || {
                if overlay_only {
                    let (overlay, outcome) =
                        build_overlay(template.page_size(), &layout, &row, signature.as_deref());
                    overlay.to_pdf_bytes().map(|bytes| (bytes, outcome))
                } else {
                    compose(&template, &layout, &row, signature.as_deref())
                        .map(|composed| (composed.bytes, composed.signature))
                }
            })
            .await??;

            tokio::fs::write(&output, &bytes).await?;
            match outcome {
                SignatureOutcome::Embedded => println!("Diploma → {}", output.display()),
                SignatureOutcome::Skipped(reason) => println!(
                    "Diploma (unsigned: {:?}) → {}",
                    reason,
                    output.display()
                ),
            }
        }

        Commands::Signature {
            input,
            output,
            threshold,
            recolor,
            recolor_threshold,
        } => {
            let bytes = read_file(&input).await?;
            let target = recolor.as_deref().map(Color::from_hex).transpose()?;

            let png = tokio::task::spawn_blocking(move || {
                let mut image = make_background_transparent(&bytes, threshold)?;
                if let Some(color) = target {
                    recolor_ink(&mut image, color, recolor_threshold);
                }
                encode_png(&image)
            })
            .await??;

            tokio::fs::write(&output, &png).await?;
            info!(bytes = png.len(), "Signature processed");
            println!("Signature → {}", output.display());
        }
    }

    Ok(())
}
