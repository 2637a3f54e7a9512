//! Output rendering and formatting

use banker_consumer::ConsumerReport;
use banker_events::EventMessage;
use banker_types::{ColorChoice, ConsumerId, LedgerSnapshot, RequestOutcome, ResourceVector};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use std::io;

/// Console renderer for ledger state and consumer activity
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
    /// Highest snapshot version seen so far
    latest_version: Option<u64>,
    /// Last snapshot actually printed
    last_rendered: Option<LedgerSnapshot>,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
            latest_version: None,
            last_rendered: None,
        }
    }

    pub fn json_output(&self) -> bool {
        self.json_output
    }

    /// Decide whether `snapshot` should be shown
    ///
    /// Snapshots not newer than one already seen are stale and dropped.
    /// A newer snapshot is shown only if its state differs from the one
    /// last shown.
    pub fn accept(&mut self, snapshot: &LedgerSnapshot) -> bool {
        if self
            .latest_version
            .is_some_and(|seen| snapshot.version <= seen)
        {
            return false;
        }
        self.latest_version = Some(snapshot.version);

        if self
            .last_rendered
            .as_ref()
            .is_some_and(|last| last.same_state(snapshot))
        {
            return false;
        }
        self.last_rendered = Some(snapshot.clone());
        true
    }

    /// Print one event as a JSON line
    pub fn render_json(&self, message: &EventMessage) -> io::Result<()> {
        let json = serde_json::to_string(message).map_err(io::Error::other)?;
        self.term.write_line(&json)
    }

    /// Write one already formatted line to stdout
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        self.term.write_line(line)
    }

    /// Capacity, each consumer's maximum and the initial state
    pub fn format_initial(
        &mut self,
        capacity: &ResourceVector,
        maxima: &[ResourceVector],
        snapshot: &LedgerSnapshot,
    ) -> String {
        self.latest_version = Some(snapshot.version);
        self.last_rendered = Some(snapshot.clone());

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Consumer").add_attribute(Attribute::Bold),
            Cell::new("Maximum").add_attribute(Attribute::Bold),
        ]);
        for (index, maximum) in maxima.iter().enumerate() {
            table.add_row(vec![Cell::new(index), Cell::new(maximum)]);
        }

        format!(
            "{}\nCapacity: {capacity}\n{table}\n{}",
            self.style_heading("=== System initialized ==="),
            self.format_state(snapshot)
        )
    }

    /// Human-readable form of a snapshot
    pub fn format_state(&self, snapshot: &LedgerSnapshot) -> String {
        let mut out = format!(
            "{}\nAvailable: {}\n",
            self.style_heading(&format!("=== State #{} ===", snapshot.version)),
            snapshot.available
        );

        if snapshot.holders.is_empty() {
            out.push_str("No allocations.");
            return out;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Consumer").add_attribute(Attribute::Bold),
            Cell::new("Allocation").add_attribute(Attribute::Bold),
        ]);
        for holder in &snapshot.holders {
            table.add_row(vec![
                Cell::new(holder.consumer.index()),
                Cell::new(&holder.allocation),
            ]);
        }
        out.push_str(&table.to_string());
        out
    }

    /// One request and its outcome
    pub fn format_request(
        &self,
        consumer: ConsumerId,
        request: &ResourceVector,
        outcome: RequestOutcome,
    ) -> String {
        let verdict = match outcome {
            RequestOutcome::Granted => self.paint(Style::new().green(), "GRANTED"),
            RequestOutcome::Denied(reason) => {
                self.paint(Style::new().yellow(), &format!("DENIED ({reason})"))
            }
        };
        format!("Consumer {} requested {request} -> {verdict}", consumer.index())
    }

    /// One committed release
    pub fn format_release(&self, consumer: ConsumerId, released: &ResourceVector) -> String {
        format!("Consumer {} released {released}", consumer.index())
    }

    /// Allocation taken back from a consumer that did not return it
    pub fn format_reclaim(&self, consumer: ConsumerId, reclaimed: &ResourceVector) -> String {
        let line = format!("Consumer {} reclaimed {reclaimed}", consumer.index());
        self.paint(Style::new().yellow(), &line)
    }

    /// Print a warning or error line to stderr
    pub fn render_problem(&self, message: &str) {
        eprintln!("{}", self.paint(Style::new().red(), message));
    }

    /// Print the per-consumer summary collected at shutdown
    pub fn render_reports(&self, reports: &[ConsumerReport]) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::json!({ "reports": reports });
            return self.term.write_line(&json.to_string());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Consumer").add_attribute(Attribute::Bold),
            Cell::new("Attempts").add_attribute(Attribute::Bold),
            Cell::new("Granted").add_attribute(Attribute::Bold),
            Cell::new("Over max").add_attribute(Attribute::Bold),
            Cell::new("Insufficient").add_attribute(Attribute::Bold),
            Cell::new("Unsafe").add_attribute(Attribute::Bold),
            Cell::new("Released").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

        for report in reports {
            let status = match &report.failure {
                Some(failure) => Cell::new(failure).fg(Color::Red),
                None => Cell::new("ok").fg(Color::Green),
            };
            table.add_row(vec![
                Cell::new(report.consumer.index()),
                Cell::new(report.attempts),
                Cell::new(report.grants),
                Cell::new(report.denials.exceeds_max_demand),
                Cell::new(report.denials.insufficient_resources),
                Cell::new(report.denials.would_be_unsafe),
                Cell::new(report.releases),
                status,
            ]);
        }

        if !self.supports_color() {
            table.force_no_tty();
        }
        self.term.write_line(&self.style_heading("=== Summary ==="))?;
        self.term.write_line(&table.to_string())
    }

    fn style_heading(&self, text: &str) -> String {
        self.paint(Style::new().bold(), text)
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.supports_color() {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}
