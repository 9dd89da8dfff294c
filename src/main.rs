use clap::Parser;
use pagewalk::config::{BatchEntry, load_batch_file};
use pagewalk::progress::LogSink;
use pagewalk::results::ExtractionRecord;
use pagewalk::utils::output_filename;
use pagewalk::{ExtractError, Extraction};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

mod args;
use args::{Args, normalize_url};

/// Pause between batch entries
const BATCH_DELAY: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    // Print WebDriver info message when JS rendering will be used
    if !args.no_js {
        println!("Note: JS rendering requires a WebDriver server (e.g., ChromeDriver).");
        println!(
            "Set WEBDRIVER_URL environment variable if not using the default http://localhost:4444"
        );
    }

    let entries = match collect_entries(&args) {
        Ok(entries) => entries,
        Err(e) => {
            ::log::error!("{}", e);
            std::process::exit(2);
        }
    };

    let total = entries.len();
    let mut succeeded = 0;
    let start_time = std::time::Instant::now();

    for (index, entry) in entries.iter().enumerate() {
        ::log::info!("[{}/{}] extracting {}", index + 1, total, entry.url);

        match extract_one(&args, entry).await {
            Ok(record) => {
                succeeded += 1;
                if let Err(e) = save_record(&args, &record) {
                    ::log::error!("failed to save output for {}: {}", entry.url, e);
                }
            }
            Err(e) => {
                ::log::error!("[{}/{}] extraction failed for {}: {}", index + 1, total, entry.url, e);
            }
        }

        // Pause between batch entries
        if index + 1 < total {
            tokio::time::sleep(BATCH_DELAY).await;
        }
    }

    let duration = start_time.elapsed();
    ::log::info!(
        "extraction complete: {} of {} URL(s) succeeded in {:.2} seconds",
        succeeded,
        total,
        duration.as_secs_f64()
    );

    if succeeded == 0 {
        std::process::exit(1);
    }
}

/// Resolve the work list: a single URL, or entries from a batch file
fn collect_entries(args: &Args) -> Result<Vec<BatchEntry>, ExtractError> {
    if let Some(batch) = &args.batch {
        return load_batch_file(batch);
    }
    match &args.url {
        Some(url) => Ok(vec![BatchEntry {
            url: url.clone(),
            selector: args.selector.clone(),
        }]),
        None => Err(ExtractError::Config(
            "either a URL or --batch is required".into(),
        )),
    }
}

/// Run one extraction and aggregate it into a record
async fn extract_one(args: &Args, entry: &BatchEntry) -> Result<ExtractionRecord, ExtractError> {
    let mut extraction = Extraction::new(&normalize_url(&entry.url))
        .with_links(!args.no_links)
        .with_js(!args.no_js)
        .with_wait_time(args.wait_time)
        .with_webdriver_url(args.webdriver_url.clone())
        .with_progress(Arc::new(LogSink));

    if let Some(selector) = entry.selector.as_deref().or(args.selector.as_deref()) {
        extraction = extraction.with_selector(selector);
    }
    if args.has_pagination {
        extraction = extraction.with_pagination(args.max_pages);
    }

    extraction.run_to_record().await
}

/// Write the extracted text, and optionally the full record as JSON
fn save_record(args: &Args, record: &ExtractionRecord) -> Result<(), std::io::Error> {
    std::fs::create_dir_all(&args.output_dir)?;

    let text_path = args.output_dir.join(output_filename(&record.url, "txt"));
    let mut body = String::with_capacity(record.url.len() + record.content.len() + 3);
    body.push_str(&record.url);
    body.push_str("\n\n");
    body.push_str(&record.content);
    body.push('\n');
    std::fs::write(&text_path, body)?;
    report_saved(&text_path, record);

    if args.json {
        let json_path = args.output_dir.join(output_filename(&record.url, "json"));
        let serialized = serde_json::to_string_pretty(record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&json_path, serialized)?;
        ::log::info!("record saved to {}", json_path.display());
    }
    Ok(())
}

fn report_saved(path: &Path, record: &ExtractionRecord) {
    ::log::info!(
        "saved {} page(s), {} character(s), {} link(s) to {}",
        record.pages_extracted,
        record.total_characters,
        record.total_links,
        path.display()
    );
}
