// src/render/html.rs
//
// Offline HTML rendering of the panel. Apart from the generated-at stamp,
// the same inputs produce identical bytes: no external assets, no RNG.

use chrono::{SecondsFormat, Utc};

use super::TableView;
use crate::panel::{PanelSurface, Status};

const CSS: &str = "\
body{font-family:system-ui,sans-serif;margin:2rem auto;max-width:960px;color:#222}\
h1{font-size:1.4rem}h2{font-size:1.1rem;margin-bottom:.3rem}\
.status{color:#666;margin-bottom:1rem}\
.warn{color:#b00020}\
.section{margin-bottom:1.5rem}\
.tbl-wrap{overflow-x:auto}\
.tbl{border-collapse:collapse;width:100%}\
.tbl th,.tbl td{border:1px solid #ddd;padding:.35rem .5rem;text-align:left}\
.tbl th{background:#f4f4f4}\
.tbl--sm th,.tbl--sm td{font-size:.85rem;padding:.2rem .4rem}\
footer{color:#999;font-size:.8rem;margin-top:2rem}";

/// `PanelSurface` that accumulates everything the panel emits and renders
/// it as one self-contained HTML document.
#[derive(Debug)]
pub struct HtmlSurface {
    status: Status,
    info: Option<String>,
    errors: Vec<String>,
    alerts: Vec<String>,
    tables: Vec<TableView>,
    reload_requested: bool,
}

impl HtmlSurface {
    pub fn new() -> Self {
        Self {
            status: Status::Locked,
            info: None,
            errors: Vec::new(),
            alerts: Vec::new(),
            tables: Vec::new(),
            reload_requested: false,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Alerts collected so far (the original shows these as blocking
    /// dialogs; a driver decides what to do with them).
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// True once per reload request; the driver re-runs the flow and calls
    /// this again until it stays false.
    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    /// Assemble the full document.
    pub fn to_html(&self) -> String {
        let mut w = Html::new();
        w.push("<!DOCTYPE html><html lang=\"es\"><head><meta charset=\"utf-8\">");
        w.push("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
        w.push("<title>Panel CSV</title><style>");
        w.push(CSS);
        w.push("</style></head><body>");
        w.push("<h1>Panel CSV</h1>");

        w.push("<p class=\"status\">estado: ");
        w.push(esc(self.status.as_str()));
        w.push("</p>");

        if let Some(info) = &self.info {
            w.push("<p>");
            w.push(esc(info));
            w.push("</p>");
        }
        for error in &self.errors {
            w.push("<p class=\"warn\">");
            w.push(esc(error));
            w.push("</p>");
        }

        w.push("<div id=\"tables\">");
        for table in &self.tables {
            write_table(&mut w, table);
        }
        w.push("</div>");

        w.push("<footer>generado: ");
        w.push(esc(&Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)));
        w.push("</footer></body></html>");
        w.finish()
    }
}

impl Default for HtmlSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelSurface for HtmlSurface {
    fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn show_info(&mut self, message: &str) {
        self.info = Some(message.to_string());
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn push_table(&mut self, table: TableView) {
        self.tables.push(table);
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn request_reload(&mut self) {
        self.reload_requested = true;
    }
}

// Minimal writer with deterministic push order.
struct Html {
    buf: String,
}

impl Html {
    fn new() -> Self {
        Self {
            buf: String::with_capacity(16 * 1024),
        }
    }

    fn push<S: AsRef<str>>(&mut self, s: S) {
        self.buf.push_str(s.as_ref());
    }

    fn finish(self) -> String {
        self.buf
    }
}

fn write_table(w: &mut Html, table: &TableView) {
    w.push("<div class=\"section\"><h2>");
    w.push(esc(&table.title));
    w.push("</h2><div class=\"tbl-wrap\"><table class=\"");
    w.push(if table.compact { "tbl tbl--sm" } else { "tbl" });
    w.push("\"><thead><tr>");
    for column in &table.columns {
        w.push("<th>");
        w.push(esc(column));
        w.push("</th>");
    }
    w.push("</tr></thead><tbody>");
    for row in &table.rows {
        w.push("<tr>");
        for cell in row {
            w.push("<td>");
            w.push(esc(cell));
            w.push("</td>");
        }
        w.push("</tr>");
    }
    w.push("</tbody></table></div></div>");
}

/// Escape text content and attribute values.
fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esc_replaces_markup_characters() {
        assert_eq!(esc("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(esc("plain"), "plain");
    }

    #[test]
    fn document_contains_status_and_table() {
        let mut surface = HtmlSurface::new();
        surface.set_status(Status::Consolidated);
        surface.show_info("Fuente: eda.csv");
        surface.push_table(TableView {
            title: "Resumen".to_string(),
            columns: vec!["metric".to_string(), "value".to_string()],
            rows: vec![vec!["total".to_string(), "42".to_string()]],
            compact: false,
        });

        let html = surface.to_html();
        assert!(html.contains("estado: EDA consolidado"));
        assert!(html.contains("<h2>Resumen</h2>"));
        assert!(html.contains("<th>metric</th><th>value</th>"));
        assert!(html.contains("<td>total</td><td>42</td>"));
        assert!(html.contains("class=\"tbl\""));
    }

    #[test]
    fn compact_tables_get_small_class() {
        let mut surface = HtmlSurface::new();
        surface.push_table(TableView {
            title: "Edad".to_string(),
            columns: vec!["metric".to_string()],
            rows: vec![],
            compact: true,
        });
        assert!(surface.to_html().contains("class=\"tbl tbl--sm\""));
    }

    #[test]
    fn cell_content_is_escaped() {
        let mut surface = HtmlSurface::new();
        surface.push_table(TableView {
            title: "T".to_string(),
            columns: vec!["c".to_string()],
            rows: vec![vec!["<script>".to_string()]],
            compact: false,
        });
        let html = surface.to_html();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn errors_render_as_warn_blocks() {
        let mut surface = HtmlSurface::new();
        surface.show_error("Error cargando CSV: boom");
        let html = surface.to_html();
        assert!(html.contains("class=\"warn\""));
        assert!(html.contains("Error cargando CSV: boom"));
    }

    #[test]
    fn reload_request_is_consumed_once() {
        let mut surface = HtmlSurface::new();
        surface.request_reload();
        assert!(surface.take_reload_request());
        assert!(!surface.take_reload_request());
    }
}
