// src/main.rs
use clap::Parser;
use edital_extractor::layout::LayoutDocument;
use edital_extractor::patterns::PatternLibrary;
use edital_extractor::pipeline::{EditalProcessor, ProcessedEdital, ProcessorConfig};
use edital_extractor::storage::{SavedFiles, StorageManager};
use edital_extractor::utils::{self, AppError};
use std::path::{Path, PathBuf};

/// Events listed in the run summary before eliding the rest.
const SUMMARY_LIMIT: usize = 5;

/// Extracts sections and structured data from an edital layout dump
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Layout dump (JSON) of the rendered edital
    input: PathBuf,

    /// Output directory for extracted content (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Ignore recognised text of scanned pages
    #[arg(long)]
    no_ocr: bool,

    /// Run everything on the calling thread
    #[arg(long)]
    sequential: bool,

    /// Debug mode - verbose logging and annotated HTML per section
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.debug);
    tracing::info!("Starting processing for args: {:?}", args);

    if !args.input.is_file() {
        return Err(AppError::Config(format!(
            "Layout file not found: {}",
            args.input.display()
        )));
    }

    // 2. Build the pattern library and load the layout
    let patterns = PatternLibrary::new()?;
    let doc = LayoutDocument::load(&args.input)?;

    // 3. Segment and extract
    let mut config = ProcessorConfig { use_ocr_pages: !args.no_ocr, ..ProcessorConfig::default() };
    config.extractor.parallel = !args.sequential;
    let processed = EditalProcessor::new(&patterns, config).process(&doc);

    // 4. Persist
    let output_dir = args.output_dir.clone().unwrap_or_else(|| default_output_dir(&args.input));
    let storage = StorageManager::new(&output_dir)?;
    let saved = storage.save_all(&processed)?;
    if args.debug {
        if let Err(e) = storage.save_debug(&patterns, &processed) {
            tracing::warn!("Failed to create debug HTML: {}", e);
        }
    }

    for (group, error) in processed.report.failures() {
        tracing::error!("Extraction of {:?} failed: {}", group, error);
    }

    print_summary(&processed, &saved);
    Ok(())
}

fn default_output_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn print_summary(processed: &ProcessedEdital, saved: &SavedFiles) {
    let result = &processed.report.result;
    println!("\n=== RESUMO DOS DADOS EXTRAÍDOS ===");

    let ident = &result.identificacao;
    if !ident.is_empty() {
        println!("\nIdentificação do Edital:");
        let fields = [
            ("numero_edital", &ident.numero_edital),
            ("orgao", &ident.orgao),
            ("ano", &ident.ano),
            ("banca", &ident.banca),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                println!("  {}: {}", key, value);
            }
        }
    }

    if !result.cronograma.is_empty() {
        println!("\nCronograma:");
        for (i, evento) in result.cronograma.iter().take(SUMMARY_LIMIT).enumerate() {
            println!("  {}. {} - {}", i + 1, evento.data, evento.descricao);
        }
        if result.cronograma.len() > SUMMARY_LIMIT {
            println!("  ... e mais {} eventos.", result.cronograma.len() - SUMMARY_LIMIT);
        }
    }

    let inscricao = &result.inscricao;
    if !inscricao.is_empty() {
        println!("\nInscrição:");
        let fields = [
            ("periodo_inicio", &inscricao.periodo_inicio),
            ("periodo_fim", &inscricao.periodo_fim),
            ("taxa", &inscricao.taxa),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                println!("  {}: {}", key, value);
            }
        }
    }

    if !result.cargos.is_empty() {
        println!("\nCargos:");
        for (i, cargo) in result.cargos.iter().take(SUMMARY_LIMIT).enumerate() {
            println!("  {}. {}", i + 1, cargo.nome);
        }
        if result.cargos.len() > SUMMARY_LIMIT {
            println!("  ... e mais {} cargos.", result.cargos.len() - SUMMARY_LIMIT);
        }
    }

    let syllabus = &result.conteudo_programatico;
    if !syllabus.is_empty() {
        println!("\nConteúdo Programático:");
        if !syllabus.conhecimentos_basicos.is_empty() {
            println!("  Conhecimentos Básicos: {} disciplinas", syllabus.conhecimentos_basicos.len());
        }
        if !syllabus.conhecimentos_especificos.is_empty() {
            println!("  Conhecimentos Específicos: {} cargos", syllabus.conhecimentos_especificos.len());
        }
    }

    if !processed.scanned_pages.is_empty() {
        let pages: Vec<String> = processed.scanned_pages.iter().map(|p| (p + 1).to_string()).collect();
        println!("\nPáginas digitalizadas: {}", pages.join(", "));
    }

    println!("\nArquivos gerados:");
    println!("  Texto extraído: {}", saved.text_file.display());
    println!("  Seções extraídas: {}", saved.sections_file.display());
    println!("  Dados estruturados: {}", saved.data_file.display());
    println!("  Metadados: {}", saved.metadata_file.display());
    println!("\nExtração concluída com sucesso!");
}
