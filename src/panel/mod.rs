// src/panel/mod.rs
//
// Orchestration of the viewer flow: session gate, consolidated load with
// raw fallback, rendering through the surface, and the recompute trigger.
// All fetches are sequential; the fallback only starts once the first
// resource is known to be empty.

use anyhow::Result;
use std::fmt;
use tracing::{error, info, warn};

use crate::api::Backend;
use crate::config::Config;
use crate::fetch::{fetch_table, CsvSource};
use crate::gate::AccessGate;
use crate::render::{eda_views, raw_view, TableView, DATASET_COLUMN};
use crate::session::SessionStore;

/// Lifecycle states surfaced to the user. Display strings are the ones the
/// original panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Locked,
    Loading,
    Consolidated,
    Raw,
    NoData,
    Recomputing,
    Updated,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Locked => "bloqueado",
            Status::Loading => "cargando...",
            Status::Consolidated => "EDA consolidado",
            Status::Raw => "respuestas (raw)",
            Status::NoData => "sin datos",
            Status::Recomputing => "recalculando...",
            Status::Updated => "actualizado",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output capability of the panel: status line, info and error blocks,
/// rendered tables, alerts and reload requests. Stands in for the DOM.
pub trait PanelSurface: Send {
    fn set_status(&mut self, status: Status);
    fn show_info(&mut self, message: &str);
    fn show_error(&mut self, message: &str);
    fn push_table(&mut self, table: TableView);
    /// Blocking notification in the original; collected here.
    fn alert(&mut self, message: &str);
    /// Ask the driver to re-run the whole flow from the network.
    fn request_reload(&mut self);
}

/// The viewer flow over injected capabilities.
pub struct Panel<'a> {
    eda_path: &'a str,
    raw_path: &'a str,
    gate: AccessGate,
    source: &'a dyn CsvSource,
    backend: &'a dyn Backend,
}

impl<'a> Panel<'a> {
    pub fn new(cfg: &'a Config, source: &'a dyn CsvSource, backend: &'a dyn Backend) -> Self {
        Self {
            eda_path: &cfg.eda_path,
            raw_path: &cfg.raw_path,
            gate: AccessGate::new(cfg.access_code.clone()),
            source,
            backend,
        }
    }

    pub fn is_open(&self, session: &dyn SessionStore) -> bool {
        self.gate.is_open(session)
    }

    /// Entry point. A session that already passed the gate goes straight to
    /// the load flow; otherwise the panel stays locked and renders nothing.
    /// Returns whether the load flow ran.
    pub async fn run(
        &self,
        session: &dyn SessionStore,
        surface: &mut dyn PanelSurface,
    ) -> bool {
        if !self.gate.is_open(session) {
            surface.set_status(Status::Locked);
            return false;
        }
        self.load(surface).await;
        true
    }

    /// Submit the passphrase. On match the flag is persisted and the load
    /// flow runs immediately; on mismatch only the inline error appears.
    pub async fn unlock(
        &self,
        input: &str,
        session: &mut dyn SessionStore,
        surface: &mut dyn PanelSurface,
    ) -> bool {
        if self.gate.unlock(input, session) {
            self.load(surface).await;
            true
        } else {
            surface.show_error("Clave incorrecta.");
            false
        }
    }

    /// Load flow with the single top-level catch: any failure below becomes
    /// status `error` plus an inline message. No retry.
    #[tracing::instrument(skip_all)]
    pub async fn load(&self, surface: &mut dyn PanelSurface) {
        surface.set_status(Status::Loading);
        if let Err(err) = self.try_load(surface).await {
            error!(error = %format!("{err:#}"), "panel load failed");
            surface.set_status(Status::Error);
            surface.show_error(&format!("Error cargando CSV: {err:#}"));
        }
    }

    async fn try_load(&self, surface: &mut dyn PanelSurface) -> Result<()> {
        let eda = fetch_table(self.source, self.eda_path).await?;
        if !eda.is_empty() {
            info!(rows = eda.rows.len(), "rendering consolidated export");
            surface.set_status(Status::Consolidated);
            surface.show_info(&format!(
                "Fuente: {}. Filtra por columna {} para ver diferentes bloques.",
                self.eda_path, DATASET_COLUMN
            ));
            for view in eda_views(&eda) {
                surface.push_table(view);
            }
            return Ok(());
        }

        let raw = fetch_table(self.source, self.raw_path).await?;
        if !raw.is_empty() {
            info!(rows = raw.rows.len(), "rendering raw export");
            surface.set_status(Status::Raw);
            surface.show_info(&format!(
                "Fuente: {}. Muestra los datos crudos exportados.",
                self.raw_path
            ));
            surface.push_table(raw_view(&raw));
            return Ok(());
        }

        info!("no export has data yet");
        surface.set_status(Status::NoData);
        surface.show_info("No hay datos aún. Usa el botón Recalcular o envía respuestas.");
        Ok(())
    }

    /// Ask the backend to regenerate the exports. Success schedules a
    /// reload through the surface; failure surfaces the backend's reported
    /// reason (or "desconocido") as an alert.
    pub async fn recompute(&self, surface: &mut dyn PanelSurface) {
        surface.set_status(Status::Recomputing);
        match self.backend.recompute().await {
            Ok(result) if result.ok => {
                info!("exports regenerated");
                surface.set_status(Status::Updated);
                surface.request_reload();
            }
            Ok(result) => {
                let reason = result.error.as_deref().unwrap_or("desconocido").to_string();
                warn!(reason = %reason, "recompute rejected by backend");
                surface.set_status(Status::Error);
                surface.alert(&format!("Error al recalcular: {reason}"));
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "recompute request failed");
                surface.set_status(Status::Error);
                surface.alert(&format!("Error al recalcular: {err:#}"));
            }
        }
    }
}
