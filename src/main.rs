use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use caseflow::{
    process_document, write_json, AnthropicClient, AnthropicConfig, AudioRef, CaseReport,
    CaseRequest, DocumentRef, LoggingReporter, Orchestrator, PipelineConfig, StageSet,
};

#[derive(Parser)]
#[command(name = "caseflow")]
#[command(author, version, about = "Patient intake triage pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one case through all five stages
    Run {
        /// Case identifier (a random UUID if omitted)
        #[arg(long)]
        case_id: Option<String>,

        /// Recognition file for the patient's recording (JSON)
        #[arg(short, long)]
        audio: Option<PathBuf>,

        /// OCR text of a document; repeat for several, order is kept
        #[arg(short, long = "document")]
        documents: Vec<PathBuf>,

        /// Write the full case record here (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a human-readable report here (text)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Per-stage timeout in seconds
        #[arg(long)]
        stage_timeout_secs: Option<u64>,

        /// Maximum documents processed in parallel
        #[arg(long)]
        max_parallel_documents: Option<usize>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Classify documents and extract their fields without a reasoning service
    Documents {
        /// OCR text files
        #[arg(required = true)]
        documents: Vec<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            case_id,
            audio,
            documents,
            output,
            report,
            stage_timeout_secs,
            max_parallel_documents,
            verbose,
        } => {
            setup_logging(verbose);
            let mut config = PipelineConfig::from_env()?;
            if let Some(secs) = stage_timeout_secs {
                config.stage_timeout = Duration::from_secs(secs);
            }
            if let Some(n) = max_parallel_documents {
                config.max_parallel_documents = n;
            }
            run_case(case_id, audio, documents, output, report, config).await
        }
        Commands::Documents { documents, verbose } => {
            setup_logging(verbose);
            analyze_documents(documents)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn run_case(
    case_id: Option<String>,
    audio: Option<PathBuf>,
    documents: Vec<PathBuf>,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
    config: PipelineConfig,
) -> Result<()> {
    let client = AnthropicClient::new(AnthropicConfig::from_env()?);
    let orchestrator = Orchestrator::new(StageSet::reference(Arc::new(client)), config);

    let case_id = case_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let mut request = CaseRequest::new(case_id.clone())
        .with_documents(documents.into_iter().map(DocumentRef::new).collect());
    if let Some(audio) = audio {
        request = request.with_audio(AudioRef::new(audio));
    }

    info!("Starting case {}", case_id);
    let outcome = orchestrator.start_case(request, Some(&LoggingReporter)).await;

    // The record exists even when the run failed; write it either way
    let record = orchestrator
        .case(&case_id)
        .context("Case missing from registry")?;
    if let Some(path) = &output {
        write_json(&record, path)?;
        info!("Case record written to {:?}", path);
    }
    if let Some(path) = &report {
        CaseReport::new(&record).write_file(path)?;
        info!("Report written to {:?}", path);
    }

    let summary = orchestrator
        .export_summary(&case_id)
        .context("Case missing from registry")?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    outcome.map(|_| ()).context("Case failed")
}

fn analyze_documents(documents: Vec<PathBuf>) -> Result<()> {
    println!("Document Analysis");
    println!("=================");

    for path in documents {
        let document = DocumentRef::new(path);
        let result = process_document(&document)?;

        println!();
        println!("{}", document);
        println!("  Type: {}", result.document_type);
        println!("  Confidence: {:.2}", result.confidence);
        if let Some(insurance) = &result.insurance {
            println!(
                "  Insurance: {} / member {} / {}",
                insurance.provider, insurance.member_id, insurance.plan_type
            );
        }
        if let Some(record) = &result.medical_record {
            println!("  Patient: {}", record.patient_name);
            println!("  Conditions: {}", record.medical_conditions.join(", "));
            println!("  Medications: {}", record.medications.join(", "));
            println!("  Allergies: {}", record.allergies.join(", "));
        }
        if let Some(rx) = &result.prescription {
            println!(
                "  Prescription: {} {} {}",
                rx.medication_name, rx.dosage, rx.frequency
            );
        }
        for warning in &result.warnings {
            println!("  Warning: {}", warning);
        }
    }

    Ok(())
}
