use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use perfview::{
    annotate, build_event_table, parse_report,
    render::{self, AnnotationContext, ReportView},
    severity::DEFAULT_THRESHOLD,
    HotThreshold,
};
use perfview_data::BenchResults;
use pmu::Catalog;
use serde::Serialize;

#[derive(Parser)]
#[command(version, about = "Browse profiler reports, annotations and PMU event tables")]
struct Cli {
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group a perf report into hotspots
    Report {
        file: PathBuf,
        #[arg(short, long, default_value_t = 10)]
        annotate_limit: usize,
        #[arg(long)]
        collapsed: bool,
    },
    /// Correlate an annotated listing with the compiler's disassembly
    Annotate {
        file: PathBuf,
        #[arg(short, long)]
        disassembly: PathBuf,
        #[arg(short, long)]
        method: String,
        #[arg(long)]
        event: Option<String>,
        #[arg(long)]
        hotspot: Option<String>,
        #[arg(long)]
        bench: Option<String>,
    },
    /// Rank the events recorded for one hotspot
    Hotspot {
        results: PathBuf,
        #[arg(short, long)]
        bench: usize,
        #[arg(long)]
        hotspot: usize,
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD, value_parser = clap::value_parser!(u32).range(1..))]
        threshold: u32,
        #[arg(short, long, default_value = pmu_data::ARM_CORTEX_A53)]
        arch: String,
        #[arg(long)]
        events_file: Option<PathBuf>,
    },
    /// List the event catalog
    Events {
        #[arg(short, long, default_value = pmu_data::ARM_CORTEX_A53)]
        arch: String,
        #[arg(long)]
        events_file: Option<PathBuf>,
    },
}

#[derive(Clone, Debug, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

fn load_catalog(arch: &str, events_file: Option<&Path>) -> Result<Catalog> {
    let catalog = Catalog::for_arch(arch).with_context(|| {
        format!(
            "known architectures: {}",
            pmu::known_architectures().join(", ")
        )
    })?;

    match events_file {
        Some(path) => Ok(catalog.with_table_file(path)?),
        None => Ok(catalog),
    }
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", text(value)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();

    match args.command {
        Commands::Report {
            file,
            annotate_limit,
            collapsed,
        } => {
            let report = parse_report(&read_text(&file).await?);
            let view = ReportView {
                annotate_limit,
                show_details: !collapsed,
            };

            emit(args.format, &report, |report| {
                let title = render::report_title(&file.display().to_string());
                format!("{title}\n{}", render::render_report(report, &view))
            })?;
        }
        Commands::Annotate {
            file,
            disassembly,
            method,
            event,
            hotspot,
            bench,
        } => {
            let (annotation, disassembly) =
                tokio::try_join!(read_text(&file), read_text(&disassembly))?;
            let correlation = annotate(&annotation, &disassembly, &method);

            let context = (event.is_some() || hotspot.is_some() || bench.is_some()).then(|| {
                AnnotationContext {
                    event: event.unwrap_or_default(),
                    hotspot: hotspot.unwrap_or_default(),
                    bench: bench.unwrap_or_default(),
                }
            });

            emit(args.format, &correlation, |correlation| {
                render::render_correlation(correlation, context.as_ref())
            })?;
        }
        Commands::Hotspot {
            results,
            bench,
            hotspot,
            threshold,
            arch,
            events_file,
        } => {
            let catalog = load_catalog(&arch, events_file.as_deref())?;
            let results = BenchResults::from_json(&read_text(&results).await?)
                .with_context(|| format!("failed to load {}", results.display()))?;
            let (bench, hotspot) = results.hotspot(bench, hotspot)?;

            let table = build_event_table(&hotspot.events, &catalog, HotThreshold::new(threshold));

            emit(args.format, &table, |table| {
                format!(
                    "{}\n{}",
                    render::hotspot_title(&hotspot.name, &bench.name),
                    render::render_event_table(table)
                )
            })?;
        }
        Commands::Events { arch, events_file } => {
            let catalog = load_catalog(&arch, events_file.as_deref())?;
            let events = catalog.events().collect::<Vec<_>>();

            emit(args.format, &events, |events| {
                events
                    .iter()
                    .map(|event| format!("{} - {}", event.display_name(), event.brief_description))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
    }

    Ok(())
}
