use chrono::NaiveDate;
use clap::Parser;
use rechnungslauf::batch::{InvoiceRun, RunReport};
use rechnungslauf::render::TemplateRenderer;
use rechnungslauf::{RechnungError, RunConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the mail relay bearer token.
#[cfg(feature = "mail")]
const MAIL_TOKEN_VAR: &str = "RECHNUNGSLAUF_MAIL_TOKEN";

#[derive(Parser, Debug)]
#[command(
    name = "rechnungslauf",
    version,
    about = "Generate this month's invoices for every company directory"
)]
struct Cli {
    /// TOML run configuration
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Root directory holding one subdirectory per company
    #[arg(long = "root")]
    root: Option<PathBuf>,

    /// Invoice template sheet
    #[arg(long = "template")]
    template: Option<PathBuf>,

    /// Issue date, YYYY-MM-DD (default: today)
    #[arg(long = "date")]
    date: Option<NaiveDate>,

    /// Process companies concurrently
    #[arg(long = "parallel")]
    parallel: bool,

    /// Upper bound on worker threads for a parallel run
    #[arg(long = "workers")]
    workers: Option<usize>,

    /// Print the run report as JSON on stdout
    #[arg(long = "json")]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match execute(&cli) {
        Ok(report) if report.failed() == 0 && report.failed_companies().count() == 0 => {
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<RunReport, RechnungError> {
    let config = load_config(cli)?;
    let today = cli
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let renderer = TemplateRenderer::load(&config.template_path, config.layout.clone())?;
    let run = with_collaborators(InvoiceRun::new(config, renderer)?)?;
    let report = run.run(today)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| RechnungError::Config(format!("cannot serialize report: {e}")))?;
        println!("{json}");
    } else {
        println!(
            "{}: {} generated, {} already generated, {} failed",
            report.date,
            report.generated(),
            report.already_generated(),
            report.failed()
        );
        for company in report.failed_companies() {
            println!(
                "  {}: {}",
                company.company,
                company.error.as_deref().unwrap_or_default()
            );
        }
    }
    Ok(report)
}

fn load_config(cli: &Cli) -> Result<RunConfig, RechnungError> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| RechnungError::io(path, e))?;
            toml::from_str::<RunConfig>(&text)
                .map_err(|e| RechnungError::Config(format!("{}: {e}", path.display())))?
        }
        None => RunConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.root_dir = root.clone();
    }
    if let Some(template) = &cli.template {
        config.template_path = template.clone();
    }
    config.parallel |= cli.parallel;
    if let Some(workers) = cli.workers {
        config.max_workers = workers;
    }
    Ok(config)
}

fn with_collaborators(run: InvoiceRun) -> Result<InvoiceRun, RechnungError> {
    #[cfg(feature = "pdf")]
    let run = run.with_converter(rechnungslauf::render::PdfConverter);

    #[cfg(feature = "mail")]
    let run = match run.config().email.relay_url.clone() {
        Some(url) if run.config().email.enabled => {
            let mut mailer = rechnungslauf::mail::HttpMailer::new(url)?;
            if let Ok(token) = std::env::var(MAIL_TOKEN_VAR) {
                mailer = mailer.with_token(token);
            }
            run.with_mailer(mailer)
        }
        _ => run,
    };

    if run.config().email.enabled && !cfg!(feature = "mail") {
        tracing::warn!("email enabled but built without the `mail` feature");
    } else if run.config().email.enabled && run.config().email.relay_url.is_none() {
        return Err(RechnungError::Config(
            "email enabled but no relay_url configured".into(),
        ));
    }
    Ok(run)
}
