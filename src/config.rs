use std::env;

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend that serves the CSV exports and the API.
    pub base_url: String,
    /// Path of the consolidated EDA export, relative to `base_url`.
    pub eda_path: String,
    /// Path of the raw response export, relative to `base_url`.
    pub raw_path: String,
    /// Passphrase for the soft access gate. Not a security boundary.
    pub access_code: String,
    /// Where the rendered HTML report is written.
    pub report_path: String,
    /// Ask the backend to regenerate the exports before the final render.
    pub recompute: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("PANEL_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            eda_path: env::var("PANEL_EDA_PATH")
                .unwrap_or_else(|_| "/csv-data/eda_ia_consolidado.csv".to_string()),
            raw_path: env::var("PANEL_RAW_PATH")
                .unwrap_or_else(|_| "/csv-data/respuestas_ia.csv".to_string()),
            access_code: env::var("PANEL_ACCESS_CODE").unwrap_or_else(|_| "itm2025".to_string()),
            report_path: env::var("PANEL_REPORT_PATH").unwrap_or_else(|_| "panel.html".to_string()),
            recompute: env::var("PANEL_RECOMPUTE").map(|v| truthy(&v)).unwrap_or(false),
        }
    }
}

fn truthy(v: &str) -> bool {
    matches!(v.to_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_values() {
        assert!(truthy("1"));
        assert!(truthy("true"));
        assert!(truthy("YES"));
        assert!(!truthy("0"));
        assert!(!truthy("no"));
        assert!(!truthy(""));
    }
}
