// src/render/mod.rs

pub mod html;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::csv::group::DatasetGroups;
use crate::csv::{CsvRow, CsvTable};

/// Column of the consolidated export that selects the section a row
/// belongs to.
pub const DATASET_COLUMN: &str = "dataset";

/// Derived view of one table: a title, ordered columns and the cell text,
/// row-major. Purely a rendering input, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Presentation hint only; the HTML surface maps it to a CSS class.
    pub compact: bool,
}

impl TableView {
    /// Project `rows` onto `columns`; values absent from a row render as
    /// empty cells. No filtering, no sorting.
    pub fn build(
        title: impl Into<String>,
        columns: Vec<String>,
        rows: &[CsvRow],
        compact: bool,
    ) -> Self {
        let cells = rows
            .iter()
            .map(|row| columns.iter().map(|c| row.get(c).to_string()).collect())
            .collect();
        Self {
            title: title.into(),
            columns,
            rows: cells,
            compact,
        }
    }
}

/// One recognized section of the consolidated export: the `dataset` value
/// it matches and how its table renders.
#[derive(Debug)]
pub struct Section {
    pub dataset: &'static str,
    pub title: &'static str,
    pub columns: &'static [&'static str],
    pub compact: bool,
}

/// Recognized datasets in display order, mirroring what the analysis job
/// emits. Rows tagged with any other value are ignored, not an error.
pub static SECTIONS: &[Section] = &[
    Section {
        dataset: "resumen",
        title: "Resumen",
        columns: &["metric", "value"],
        compact: false,
    },
    Section {
        dataset: "edad_stats",
        title: "Edad — Stats",
        columns: &["metric", "value"],
        compact: true,
    },
    Section {
        dataset: "por_fecha",
        title: "Respuestas por Fecha",
        columns: &["fecha", "conteo"],
        compact: false,
    },
    Section {
        dataset: "por_facultad",
        title: "Respuestas por Facultad",
        columns: &["facultad", "conteo"],
        compact: false,
    },
    Section {
        dataset: "por_carrera",
        title: "Respuestas por Carrera",
        columns: &["carrera", "conteo"],
        compact: false,
    },
    Section {
        dataset: "freq_simple",
        title: "Frecuencias Simples",
        columns: &["campo", "categoria", "conteo"],
        compact: false,
    },
    Section {
        dataset: "freq_multi",
        title: "Frecuencias Multiselección",
        columns: &["campo", "categoria", "conteo"],
        compact: false,
    },
    Section {
        dataset: "cross_facultad_familiaridad",
        title: "Facultad × Familiaridad",
        columns: &["facultad", "familiaridad", "conteo"],
        compact: false,
    },
    Section {
        dataset: "cross_facultad_confianza",
        title: "Facultad × Confianza",
        columns: &["facultad", "confianza", "conteo"],
        compact: false,
    },
];

static SECTION_INDEX: Lazy<HashMap<&'static str, &'static Section>> =
    Lazy::new(|| SECTIONS.iter().map(|s| (s.dataset, s)).collect());

/// Section for a `dataset` value, if recognized.
pub fn section_for(dataset: &str) -> Option<&'static Section> {
    SECTION_INDEX.get(dataset).copied()
}

/// Tables for the consolidated export: one per recognized non-empty dataset
/// group, in registry order. Intra-group row order follows the source.
pub fn eda_views(table: &CsvTable) -> Vec<TableView> {
    let groups = DatasetGroups::partition(&table.rows, DATASET_COLUMN);
    SECTIONS
        .iter()
        .filter_map(|section| {
            groups.get(section.dataset).map(|rows| {
                TableView::build(
                    section.title,
                    section.columns.iter().map(|c| c.to_string()).collect(),
                    rows,
                    section.compact,
                )
            })
        })
        .collect()
}

/// Single table for the raw export, using the file's own header order.
pub fn raw_view(table: &CsvTable) -> TableView {
    TableView::build("Respuestas (raw)", table.headers.clone(), &table.rows, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::parse_csv;

    #[test]
    fn registry_has_nine_sections() {
        assert_eq!(SECTIONS.len(), 9);
        assert!(section_for("resumen").is_some());
        assert!(section_for("cross_facultad_confianza").is_some());
        assert!(section_for("foo").is_none());
    }

    #[test]
    fn build_projects_onto_columns() {
        let rows = vec![CsvRow::from_pairs(&[("metric", "total"), ("value", "42")])];
        let view = TableView::build(
            "Resumen",
            vec!["metric".to_string(), "value".to_string()],
            &rows,
            false,
        );
        assert_eq!(view.rows, vec![vec!["total".to_string(), "42".to_string()]]);
    }

    #[test]
    fn build_fills_absent_values_with_empty() {
        let rows = vec![CsvRow::from_pairs(&[("metric", "total")])];
        let view = TableView::build(
            "Resumen",
            vec!["metric".to_string(), "value".to_string()],
            &rows,
            false,
        );
        assert_eq!(view.rows[0][1], "");
    }

    #[test]
    fn eda_ignores_unrecognized_datasets() {
        let table = parse_csv(
            "dataset,metric,value\nresumen,total,42\nfoo,x,1\n",
        );
        let views = eda_views(&table);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].title, "Resumen");
        assert_eq!(views[0].rows, vec![vec!["total".to_string(), "42".to_string()]]);
    }

    #[test]
    fn eda_views_follow_registry_order() {
        // Source order reversed relative to the registry.
        let table = parse_csv(
            "dataset,fecha,conteo,metric,value\npor_fecha,2025-08-01,3,,\nresumen,,,total,42\n",
        );
        let views = eda_views(&table);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].title, "Resumen");
        assert_eq!(views[1].title, "Respuestas por Fecha");
    }

    #[test]
    fn eda_preserves_intra_group_order() {
        let table = parse_csv(
            "dataset,fecha,conteo\npor_fecha,2025-08-01,3\npor_fecha,2025-08-02,5\n",
        );
        let views = eda_views(&table);
        assert_eq!(views[0].rows[0][0], "2025-08-01");
        assert_eq!(views[0].rows[1][0], "2025-08-02");
    }

    #[test]
    fn compact_hint_comes_from_registry() {
        let table = parse_csv("dataset,metric,value\nedad_stats,edad_min,17\n");
        let views = eda_views(&table);
        assert!(views[0].compact);
    }

    #[test]
    fn raw_view_uses_source_header_order() {
        let table = parse_csv("a,b\n1,2\n");
        let view = raw_view(&table);
        assert_eq!(view.title, "Respuestas (raw)");
        assert_eq!(view.columns, vec!["a", "b"]);
        assert_eq!(view.rows, vec![vec!["1".to_string(), "2".to_string()]]);
        assert!(!view.compact);
    }
}
