//! Assignment Cover CLI tool
//!
//! A command-line tool for building assignment cover pages and exporting them as PDFs.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use assignment_cover::config::{load_cover_sheet, CoverSheet, Settings, API_KEY_VAR};
use assignment_cover::date::resolve_submission_date;
use assignment_cover::export::{
    AssetResolver, ExportController, ExportOptions, ExportOutcome, StderrNotifier,
};
use assignment_cover::fields::Field;
use assignment_cover::pdf::{inspect_file, FontBook};
use assignment_cover::refine::{GeminiClient, TitleRefiner};
use assignment_cover::template::TemplateKind;
use assignment_cover::{Session, Shell};

/// Assignment Cover - Build academic cover pages and export them as PDFs
#[derive(Parser)]
#[command(name = "assignment-cover")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Write a starter cover sheet, edit it, then export
    assignment-cover init -o cover.toml
    assignment-cover export --sheet cover.toml -o out/

    # Override fields on the command line
    assignment-cover export --author \"Ana Lee\" --subject \"Data Systems\" --template modern

    # Refine the topic before exporting (needs API_KEY)
    assignment-cover export --sheet cover.toml --refine --open

    # Preview at a 600px wide container
    assignment-cover preview --sheet cover.toml --width 600 -o preview.svg")]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where the cover fields come from
#[derive(Args, Debug, Default)]
struct CoverArgs {
    /// Cover sheet file to start from (defaults to the sample cover)
    #[arg(long)]
    sheet: Option<PathBuf>,

    /// Institution name
    #[arg(long)]
    institution: Option<String>,

    /// Student name
    #[arg(long)]
    author: Option<String>,

    /// Roll number
    #[arg(long)]
    roll: Option<String>,

    /// Subject or course
    #[arg(long)]
    subject: Option<String>,

    /// Assignment topic or title
    #[arg(long)]
    topic: Option<String>,

    /// Degree program
    #[arg(long)]
    program: Option<String>,

    /// Current semester
    #[arg(long)]
    semester: Option<String>,

    /// Submission date (e.g., "16 Feb 2026", "today", "friday+1", "2026-02-16")
    #[arg(long)]
    date: Option<String>,

    /// Supervising professor
    #[arg(long)]
    supervisor: Option<String>,

    /// Template to render
    #[arg(short, long, value_enum)]
    template: Option<TemplateKind>,

    /// Custom logo image
    #[arg(long, conflicts_with = "no_logo")]
    logo: Option<PathBuf>,

    /// Hide the logo
    #[arg(long)]
    no_logo: bool,
}

impl CoverArgs {
    fn overrides(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        [
            (Field::Institution, &self.institution),
            (Field::Author, &self.author),
            (Field::RollNumber, &self.roll),
            (Field::Subject, &self.subject),
            (Field::Topic, &self.topic),
            (Field::Program, &self.program),
            (Field::Semester, &self.semester),
            (Field::SubmissionDate, &self.date),
            (Field::Supervisor, &self.supervisor),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|value| (field, value)))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter cover sheet
    Init {
        /// Output sheet path
        #[arg(short, long, default_value = "cover.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Export the cover page as a PDF
    Export {
        #[command(flatten)]
        cover: CoverArgs,

        /// Refine the topic into a more academic title first
        #[arg(long)]
        refine: bool,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Milliseconds to wait for images before capture
        #[arg(long, default_value_t = 400)]
        settle_ms: u64,

        /// Do not fetch the default logo over the network
        #[arg(long)]
        offline: bool,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,

        /// Extra directory of TrueType fonts for text outside WinAnsi
        #[arg(long)]
        font_dir: Option<PathBuf>,
    },

    /// Write an SVG preview scaled to a container width
    Preview {
        #[command(flatten)]
        cover: CoverArgs,

        /// Container width in pixels
        #[arg(long, default_value_t = 800.0)]
        width: f64,

        /// Output SVG file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print a refined version of a topic
    Refine {
        /// Subject the assignment belongs to
        #[arg(long)]
        subject: String,

        /// Current topic
        #[arg(long)]
        topic: String,
    },

    /// List the available templates
    Templates,

    /// Show information about an exported PDF
    Info {
        /// PDF file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { output, force } => cmd_init(&output, force),
        Commands::Export {
            cover,
            refine,
            output_dir,
            settle_ms,
            offline,
            open,
            font_dir,
        } => cmd_export(cover, refine, output_dir, settle_ms, offline, open, font_dir).await,
        Commands::Preview {
            cover,
            width,
            output,
        } => cmd_preview(cover, width, &output).await,
        Commands::Refine { subject, topic } => cmd_refine(&subject, &topic).await,
        Commands::Templates => {
            cmd_templates();
            Ok(())
        }
        Commands::Info { input } => cmd_info(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("assignment_cover={}", level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Session from the sheet (or the sample cover) plus command-line overrides,
/// and the logo file to load, if any
fn load_session(cover: &CoverArgs) -> Result<(Session, Option<PathBuf>)> {
    let (sheet, base) = match &cover.sheet {
        Some(path) => {
            let sheet = load_cover_sheet(path)
                .with_context(|| format!("Failed to read cover sheet {}", path.display()))?;
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (sheet, base)
        }
        None => (CoverSheet::starter(), PathBuf::new()),
    };

    let logo = cover.logo.clone().or_else(|| sheet.logo_path(&base));
    let template = cover.template.unwrap_or(sheet.template);
    let mut fields = sheet.fields;

    for (field, value) in cover.overrides() {
        fields.set(field, value);
    }
    fields.submission_date = resolve_submission_date(&fields.submission_date);
    if cover.no_logo {
        fields.show_logo = false;
    }

    Ok((Session::new(fields, template), logo))
}

fn build_shell(session: Session, exporter: ExportController) -> Result<Shell> {
    let settings = Settings::from_env();
    let generator = GeminiClient::new(settings.api_key)?;
    Ok(Shell::new(session, TitleRefiner::new(Arc::new(generator)), exporter))
}

/// Write a starter cover sheet
fn cmd_init(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }
    let text = CoverSheet::starter().to_toml()?;
    std::fs::write(output, text)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}

/// Export the cover page
async fn cmd_export(
    cover: CoverArgs,
    refine: bool,
    output_dir: PathBuf,
    settle_ms: u64,
    offline: bool,
    open: bool,
    font_dir: Option<PathBuf>,
) -> Result<()> {
    let (session, logo) = load_session(&cover)?;

    let options = ExportOptions {
        settle_delay: Duration::from_millis(settle_ms),
        ..ExportOptions::default()
    };
    let assets = if offline {
        AssetResolver::offline()
    } else {
        AssetResolver::online()?
    };
    let mut exporter =
        ExportController::new(output_dir, options, assets, Arc::new(StderrNotifier));
    if let Some(dir) = font_dir {
        let mut fonts = FontBook::system();
        fonts
            .load_dir(&dir)
            .with_context(|| format!("Failed to load fonts from {}", dir.display()))?;
        exporter = exporter.with_fonts(Arc::new(fonts));
    }
    let shell = build_shell(session, exporter)?;

    if let Some(logo) = logo {
        // A logo that fails to load leaves the default in place
        let _ = shell.load_logo(&logo).await;
    }

    if refine {
        if !Settings::from_env().has_api_key() {
            warn!("{} is not set, the topic will most likely stay unchanged", API_KEY_VAR);
        }
        shell.refine_title().await;
        info!("Topic: {}", shell.fields().topic);
    }

    match shell.export_pdf(&shell.preview_handle()).await {
        ExportOutcome::Saved(path) => {
            println!("Saved {}", path.display());
            if open {
                open_file(&path)?;
            }
            Ok(())
        }
        ExportOutcome::Failed(message) => Err(anyhow!(message)),
        ExportOutcome::Busy => bail!("An export is already running"),
        ExportOutcome::Unresolved => bail!("Nothing to export"),
    }
}

/// Write the SVG preview
async fn cmd_preview(cover: CoverArgs, width: f64, output: &Path) -> Result<()> {
    let (session, logo) = load_session(&cover)?;
    let exporter = ExportController::new(
        ".",
        ExportOptions::default(),
        AssetResolver::offline(),
        Arc::new(StderrNotifier),
    );
    let shell = build_shell(session, exporter)?;

    if let Some(logo) = logo {
        let _ = shell.load_logo(&logo).await;
    }

    let scale = shell.mount(width);
    std::fs::write(output, shell.preview_svg())
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Wrote {} (scale {:.3}, height {:.1}px)",
        output.display(),
        scale,
        shell.reserved_height()
    );
    Ok(())
}

/// Print a refined topic
async fn cmd_refine(subject: &str, topic: &str) -> Result<()> {
    let settings = Settings::from_env();
    if !settings.has_api_key() {
        warn!("{} is not set, the topic will most likely stay unchanged", API_KEY_VAR);
    }
    let refiner = TitleRefiner::new(Arc::new(GeminiClient::new(settings.api_key)?));
    println!("{}", refiner.refine(subject, topic).await);
    Ok(())
}

/// List templates
fn cmd_templates() {
    for kind in TemplateKind::ALL {
        let marker = if kind == TemplateKind::default() { " (default)" } else { "" };
        println!("{:<12} {}{}", kind.name(), kind.description(), marker);
    }
}

/// Show PDF information
fn cmd_info(input: &Path) -> Result<()> {
    let summary = inspect_file(input)?;
    let (width, height) = summary.page_size;

    println!("File: {}", input.display());
    println!("Pages: {}", summary.page_count);
    println!(
        "Page size: {:.1} x {:.1} pt ({:.0} x {:.0} mm)",
        width,
        height,
        width * 25.4 / 72.0,
        height * 25.4 / 72.0
    );

    if let Some(title) = summary.title {
        println!("Title: {}", title);
    }
    if let Some(author) = summary.author {
        println!("Author: {}", author);
    }
    if let Some(subject) = summary.subject {
        println!("Subject: {}", subject);
    }

    Ok(())
}
