//! Command-line client: load the dashboard once, optionally run actions, print a summary.

use std::sync::Arc;
use std::time::Duration;

use dashsync::api::HttpBackend;
use dashsync::clock::SystemClock;
use dashsync::config::{self, DashboardConfig};
use dashsync::controller::{ControllerOptions, DashboardController, DashboardEvent};
use dashsync::logging;
use dashsync::sync::{MergePolicy, NotificationFilter};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Default, PartialEq)]
struct Options {
    api_url: Option<String>,
    partial: bool,
    mark_read: Vec<String>,
    analyze: Vec<String>,
    refresh_analytics: bool,
    write_config: bool,
    log_level: Option<String>,
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    let mut config = config::load_or_default().map_err(|err| err.to_string())?;
    apply_options(&mut config, &options);
    match logging::init(&config.logging) {
        Ok(Some(path)) => tracing::info!("Logging to {}", path.display()),
        Ok(None) => {}
        Err(err) => eprintln!("Logging disabled: {err}"),
    }
    if options.write_config {
        config::save(&config).map_err(|err| err.to_string())?;
        let path = config::config_path().map_err(|err| err.to_string())?;
        println!("Wrote {}", path.display());
    }

    let backend = HttpBackend::new(&config.api).map_err(|err| err.to_string())?;
    tracing::info!("Using backend {}", backend.base_url());
    let wait = wait_budget(&config);
    let mut controller = DashboardController::new(
        Arc::new(backend),
        Arc::new(SystemClock),
        ControllerOptions::from_config(&config),
    );

    controller.load(true);
    report(&controller.wait_for_idle(wait));
    if controller.snapshot().last_updated.is_none() && controller.snapshot().error.is_some() {
        return Err(controller.status().text.clone());
    }

    for id in &options.mark_read {
        controller.mark_read(id);
    }
    for document_id in &options.analyze {
        controller.analyze(document_id);
    }
    if options.refresh_analytics {
        controller.refresh_analytics();
    }
    report(&controller.wait_for_idle(wait));

    print_summary(&controller);
    Ok(())
}

fn apply_options(config: &mut DashboardConfig, options: &Options) {
    if let Some(url) = &options.api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    if options.partial {
        config.sync.merge_policy = MergePolicy::PartialSuccess;
    }
    if let Some(level) = &options.log_level {
        config.logging.level = level.clone();
    }
}

/// Worst case for one round: probe plus fan-out, then a follow-up reload.
fn wait_budget(config: &DashboardConfig) -> Duration {
    config.api.request_timeout() * 4 + Duration::from_secs(1)
}

fn report(events: &[DashboardEvent]) {
    for event in events {
        match event {
            DashboardEvent::LoadFailed(err) => eprintln!("Load failed: {err}"),
            DashboardEvent::ReadCompensated { id, error }
            | DashboardEvent::ReadFailed { id, error } => {
                eprintln!("Notification {id} not marked read: {error}")
            }
            DashboardEvent::AnalysisFinished {
                document_id,
                result: Ok(report),
                ..
            } => println!("Analysis of {document_id}: {}", report.0),
            DashboardEvent::AnalysisFinished {
                document_id,
                result: Err(err),
                ..
            } => eprintln!("Analysis of {document_id} failed: {err}"),
            DashboardEvent::AnalyticsRefreshFailed(err) => eprintln!("{err}"),
            DashboardEvent::SnapshotLoaded { .. }
            | DashboardEvent::ReadConfirmed { .. }
            | DashboardEvent::AnalyticsRefreshed => {}
        }
    }
}

fn print_summary(controller: &DashboardController) {
    let snapshot = controller.snapshot();
    if let Some(overview) = &snapshot.overview {
        println!(
            "Documents: {} total, {} processed",
            overview.total_documents, overview.processed_documents
        );
        println!(
            "Compliance rate: {:.1}%  Average score: {:.1}  High-risk items: {}",
            overview.compliance_rate, overview.average_score, overview.high_risk_items
        );
        println!("Backend health: {}", overview.backend_health);
    }
    for document in &snapshot.documents {
        println!(
            "  {:<40} {:>6.1}  {:?}  {}",
            document.file_name, document.overall_score, document.risk_level, document.status
        );
    }
    println!(
        "Notifications: {} unread, {} compliance alerts",
        controller.unread_count(),
        controller
            .notifications(NotificationFilter::Compliance)
            .len()
    );
    println!("Timeline events: {}", snapshot.timeline.len());
    if let Some(error) = &snapshot.error {
        println!("Error: {error}");
    }
}

fn parse_args(args: Vec<String>) -> Result<Option<Options>, String> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(None);
    }
    let mut options = Options::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--api-url" => options.api_url = Some(next_value(&mut it, &arg)?),
            "--partial" => options.partial = true,
            "--mark-read" => options.mark_read.push(next_value(&mut it, &arg)?),
            "--analyze" => options.analyze.push(next_value(&mut it, &arg)?),
            "--refresh-analytics" => options.refresh_analytics = true,
            "--write-config" => options.write_config = true,
            "--log-level" => options.log_level = Some(next_value(&mut it, &arg)?),
            _ => return Err(format!("Unknown argument: {arg}")),
        }
    }
    Ok(Some(options))
}

fn next_value(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    it.next()
        .ok_or_else(|| format!("Missing value for {flag}"))
}

fn print_help() {
    println!("Usage: dashsync [options]");
    println!();
    println!("Options:");
    println!("  --api-url <url>       Backend base URL (overrides config and DASHSYNC_API_URL)");
    println!("  --partial             Apply resources that loaded even if others failed");
    println!("  --mark-read <id>      Mark a notification read (repeatable)");
    println!("  --analyze <doc-id>    Analyze a document, then reload (repeatable)");
    println!("  --refresh-analytics   Recompute analytics on the backend");
    println!("  --write-config        Save the effective config to the config file");
    println!("  --log-level <filter>  Log filter such as debug or dashsync=trace (RUST_LOG wins)");
}
