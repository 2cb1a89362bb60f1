use chrono::NaiveDate;
use std::fs;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;

use super::report::{CompanyReport, CustomerOutcome, CustomerReport, Delivery, RunReport};
use super::roster::{RosterEntry, company_dirs, dir_name, load_company};
use crate::core::{
    Company, Customer, EmailDetails, InvoiceRecord, RechnungError, RunConfig, Supplier,
};
use crate::mail::Mailer;
use crate::numbering::SequenceLedger;
use crate::render::{DocumentConverter, Renderer};
use crate::sheet::{RecordSchema, SheetRecord};

/// Drives one invoice run over every company under the configured root.
///
/// Each company's ledger is loaded, advanced once per newly generated
/// invoice and committed at the end of the company's pass. A failed save
/// rolls its reservation back; conversion and mail failures are only
/// reported.
///
/// # Example
///
/// ```no_run
/// use rechnungslauf::RunConfigBuilder;
/// use rechnungslauf::batch::InvoiceRun;
/// use rechnungslauf::render::TemplateRenderer;
///
/// let config = RunConfigBuilder::new("/srv/invoices", "/srv/invoices/template.csv").build();
/// let renderer = TemplateRenderer::load(&config.template_path, config.layout.clone())?;
/// let run = InvoiceRun::new(config, renderer)?;
/// let report = run.run(chrono::Local::now().date_naive())?;
/// println!("{} invoices generated", report.generated());
/// # Ok::<(), rechnungslauf::RechnungError>(())
/// ```
pub struct InvoiceRun {
    config: RunConfig,
    suppliers: RecordSchema<Supplier>,
    customers: RecordSchema<Customer>,
    renderer: Box<dyn Renderer>,
    converter: Option<Box<dyn DocumentConverter>>,
    mailer: Option<Box<dyn Mailer>>,
}

impl InvoiceRun {
    /// Validate `config` and build the record schemas.
    ///
    /// Configuration errors surface here, before any company is touched.
    pub fn new(config: RunConfig, renderer: impl Renderer + 'static) -> Result<Self, RechnungError> {
        config.validate()?;
        Ok(Self {
            config,
            suppliers: Supplier::schema()?,
            customers: Customer::schema()?,
            renderer: Box::new(renderer),
            converter: None,
            mailer: None,
        })
    }

    pub fn with_converter(mut self, converter: impl DocumentConverter + 'static) -> Self {
        self.converter = Some(Box::new(converter));
        self
    }

    pub fn with_mailer(mut self, mailer: impl Mailer + 'static) -> Self {
        self.mailer = Some(Box::new(mailer));
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Load every company under the root. Only an unreadable root is an error.
    pub fn load_roster(&self) -> Result<Vec<RosterEntry>, RechnungError> {
        let roster = company_dirs(&self.config.root_dir)?
            .into_iter()
            .map(|dir| {
                let company = load_company(&dir, &self.config, &self.suppliers, &self.customers);
                if let Err(e) = &company {
                    tracing::error!(dir = %dir.display(), error = %e, "company skipped");
                }
                RosterEntry {
                    name: dir_name(&dir),
                    dir,
                    company,
                }
            })
            .collect();
        Ok(roster)
    }

    /// Run every company, sequentially or in parallel as configured.
    pub fn run(&self, today: NaiveDate) -> Result<RunReport, RechnungError> {
        if self.config.parallel {
            return self.run_parallel(today);
        }
        let _span = tracing::info_span!("run", %today).entered();
        let companies = self
            .load_roster()?
            .into_iter()
            .map(|entry| self.process_entry(entry, today))
            .collect();
        Ok(self.finish(today, companies))
    }

    /// Run companies on a bounded pool of scoped worker threads.
    ///
    /// Workers take whole companies from a shared queue, so a ledger is only
    /// ever touched by one thread. At most `max_workers` threads run, or the
    /// available parallelism when it is 0. Reports keep roster order.
    pub fn run_parallel(&self, today: NaiveDate) -> Result<RunReport, RechnungError> {
        let roster = self.load_roster()?;
        let workers = self.worker_count(roster.len());
        let _span = tracing::info_span!("run", %today, parallel = true, workers).entered();

        let queue = Mutex::new(roster.into_iter().enumerate());
        let mut done: Vec<(usize, CompanyReport)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        let mut reports = Vec::new();
                        while let Some((slot, entry)) = queue.lock().ok().and_then(|mut q| q.next())
                        {
                            let name = entry.name.clone();
                            let report = panic::catch_unwind(AssertUnwindSafe(|| {
                                self.process_entry(entry, today)
                            }))
                            .unwrap_or_else(|_| {
                                tracing::error!(company = %name, "company worker panicked");
                                CompanyReport::failed(name, "company worker panicked")
                            });
                            reports.push((slot, report));
                        }
                        reports
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|worker| worker.join().unwrap_or_default())
                .collect()
        });
        done.sort_by_key(|(slot, _)| *slot);
        let companies = done.into_iter().map(|(_, report)| report).collect();
        Ok(self.finish(today, companies))
    }

    fn worker_count(&self, companies: usize) -> usize {
        let cap = match self.config.max_workers {
            0 => thread::available_parallelism().map_or(1, NonZeroUsize::get),
            n => n,
        };
        cap.min(companies).max(1)
    }

    /// Process one loaded company: numbering, rendering and delivery.
    pub fn process_company(&self, company: &Company, today: NaiveDate) -> CompanyReport {
        let _span = tracing::info_span!("company", company = %company.name).entered();
        let ledger_path = self.config.ledger_path(&company.dir);

        let mut ledger = match SequenceLedger::load(&ledger_path, self.config.ledger_first_data_row)
        {
            Ok(ledger) => ledger,
            Err(e) => {
                tracing::error!(error = %e, "ledger could not be loaded");
                return CompanyReport::failed(&company.name, e);
            }
        };

        let customers = company
            .customers
            .iter()
            .map(|customer| CustomerReport {
                customer: customer.name().to_string(),
                outcome: self.process_customer(company, customer, &mut ledger, today),
            })
            .collect();

        let (ledger_committed, error) = match ledger.commit(&ledger_path) {
            Ok(written) => (written, None),
            Err(e) => {
                tracing::error!(error = %e, "ledger could not be written");
                (false, Some(e.to_string()))
            }
        };
        CompanyReport {
            company: company.name.clone(),
            customers,
            ledger_committed,
            error,
        }
    }

    /// Where the invoice for `customer` is saved in the period of `today`.
    pub fn invoice_path(&self, company: &Company, customer: &Customer, today: NaiveDate) -> PathBuf {
        company
            .dir
            .join(&self.config.output_dir_name)
            .join(today.format("%m%Y").to_string())
            .join(format!(
                "invoice_{}.{}",
                sanitize(customer.name()),
                self.renderer.extension()
            ))
    }

    fn process_entry(&self, entry: RosterEntry, today: NaiveDate) -> CompanyReport {
        match entry.company {
            Ok(company) => self.process_company(&company, today),
            Err(e) => CompanyReport::failed(entry.name, e),
        }
    }

    fn process_customer(
        &self,
        company: &Company,
        customer: &Customer,
        ledger: &mut SequenceLedger,
        today: NaiveDate,
    ) -> CustomerOutcome {
        let target = self.invoice_path(company, customer, today);
        if target.exists() {
            tracing::debug!(customer = %customer.name(), "invoice already generated");
            return CustomerOutcome::AlreadyGenerated { document: target };
        }

        let reservation = match ledger.reserve(today) {
            Ok(reservation) => reservation,
            Err(e) => {
                tracing::error!(customer = %customer.name(), error = %e, "no number reserved");
                return CustomerOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let record = InvoiceRecord {
            company: &company.name,
            supplier: &company.supplier,
            customer,
            identifier: reservation.identifier,
            issue_date: reservation.issue_date,
        };

        let document = match self.save(&record, &target) {
            Ok(document) => {
                ledger.confirm();
                document
            }
            Err(e) => {
                if let Err(rollback) = ledger.rollback() {
                    tracing::error!(error = %rollback, "reservation could not be rolled back");
                }
                tracing::warn!(
                    customer = %customer.name(),
                    identifier = %record.identifier,
                    error = %e,
                    "invoice not saved, number released"
                );
                return CustomerOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };
        tracing::info!(
            customer = %customer.name(),
            identifier = %record.identifier,
            path = %document.display(),
            "invoice generated"
        );

        let converted = self.converter.as_ref().and_then(|converter| {
            converter
                .convert(&document)
                .inspect_err(|e| {
                    tracing::warn!(customer = %customer.name(), error = %e, "conversion failed");
                })
                .ok()
        });
        let attachment = converted.as_deref().unwrap_or(&document);
        let delivery = self.deliver(company, customer, attachment);

        CustomerOutcome::Generated {
            identifier: record.identifier,
            document,
            converted,
            delivery,
        }
    }

    fn save(&self, record: &InvoiceRecord<'_>, target: &Path) -> Result<PathBuf, RechnungError> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| RechnungError::io(parent, e))?;
        }
        self.renderer.render(record, target)
    }

    fn deliver(&self, company: &Company, customer: &Customer, attachment: &Path) -> Delivery {
        let Some(mailer) = self.mailer.as_ref().filter(|_| self.config.email.enabled) else {
            return Delivery::Disabled;
        };
        if !customer.wants_email() {
            return Delivery::Skipped("customer opted out".into());
        }
        let from = company.supplier.contact_email.trim();
        let to = customer.contact_email.trim();
        if from.is_empty() || to.is_empty() {
            return Delivery::Skipped("missing email address".into());
        }

        let email = EmailDetails {
            from: from.to_string(),
            to: to.to_string(),
            subject: self.config.email.subject_for(&company.name),
            body_html: self.config.email.body_html.clone(),
            attachment: attachment.to_path_buf(),
        };
        match mailer.send(&email) {
            Ok(()) => {
                tracing::info!(to = %email.to, "invoice emailed");
                Delivery::Sent
            }
            Err(e) => {
                tracing::warn!(to = %email.to, error = %e, "invoice email failed");
                Delivery::Failed(e.to_string())
            }
        }
    }

    fn finish(&self, today: NaiveDate, companies: Vec<CompanyReport>) -> RunReport {
        let report = RunReport {
            date: today,
            companies,
        };
        tracing::info!(
            generated = report.generated(),
            already_generated = report.already_generated(),
            failed = report.failed(),
            failed_companies = report.failed_companies().count(),
            "run finished"
        );
        report
    }
}

/// Customer name as a single path component.
fn sanitize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize(" A/B\\C:D "), "A_B_C_D");
        assert_eq!(sanitize("Cara"), "Cara");
    }
}
