use anyhow::{bail, Context, Result};
use encuesta::{
    api::HttpBackend,
    config::Config,
    fetch::HttpCsvSource,
    panel::Panel,
    render::html::HtmlSurface,
    session::MemorySession,
};
use reqwest::Client;
use std::{
    env,
    io::{self, Write},
    path::Path,
};
use tempfile::NamedTempFile;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration & capabilities ─────────────────────────────
    let cfg = Config::from_env();
    let client = Client::new();
    let source = HttpCsvSource::new(client.clone(), &cfg.base_url)?;
    let backend = HttpBackend::new(client, &cfg.base_url)?;
    let panel = Panel::new(&cfg, &source, &backend);

    // ─── 3) pass the gate ────────────────────────────────────────────
    // The session is process-scoped, so the code is always asked once.
    let mut session = MemorySession::default();
    let code = match env::var("PANEL_CODE") {
        Ok(code) => code,
        Err(_) => prompt_code()?,
    };
    let mut surface = HtmlSurface::new();
    if !panel.unlock(&code, &mut session, &mut surface).await {
        bail!("clave incorrecta");
    }

    // ─── 4) optional recompute, then reload loop ─────────────────────
    if cfg.recompute {
        panel.recompute(&mut surface).await;
    }
    while surface.take_reload_request() {
        surface = HtmlSurface::new();
        panel.run(&session, &mut surface).await;
    }
    for alert in surface.alerts() {
        warn!(alert = %alert, "backend alert");
    }

    // ─── 5) write the report ─────────────────────────────────────────
    write_report(Path::new(&cfg.report_path), &surface.to_html())?;
    info!(path = %cfg.report_path, status = %surface.status(), "report written");
    Ok(())
}

fn prompt_code() -> Result<String> {
    eprint!("clave de acceso: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    let read = io::stdin()
        .read_line(&mut line)
        .context("reading access code from stdin")?;
    if read == 0 {
        bail!("no access code provided (set PANEL_CODE or type one)");
    }
    Ok(line)
}

/// Write via a temp file in the target directory, then rename, so a crash
/// never leaves a half-written report behind.
fn write_report(path: &Path, html: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).context("creating temp report file")?;
    tmp.write_all(html.as_bytes()).context("writing report")?;
    tmp.persist(path)
        .with_context(|| format!("persisting report to {}", path.display()))?;
    Ok(())
}
