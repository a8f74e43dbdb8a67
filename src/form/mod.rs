// src/form/mod.rs
//
// Survey form: schema, client-side validation and submission. The original
// probed the DOM for every field on each submit; here the deployed form is
// described once by a `FormSchema` and validation only applies to fields
// the schema declares present. Allowed value sets mirror the backend
// collection, so a payload that passes here is accepted server-side apart
// from transport faults.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::api::{truncate_chars, ApiResult, Backend};

pub const EDAD_MIN: i64 = 15;
pub const EDAD_MAX: i64 = 99;
/// Free-text answers are capped at this many characters.
pub const TEXT_MAX: usize = 120;

const FACULTADES: &[&str] = &[
    "artes_humanidades",
    "ingenierias",
    "ciencias_economicas_administrativas",
    "ciencias_exactas_aplicadas",
];

const CARRERAS: &[&str] = &[
    // Artes y Humanidades
    "artes_grabacion_produccion_musical",
    "artes_visuales",
    "cine",
    "ingenieria_diseno_industrial",
    "tecnologia_diseno_industrial",
    "tecnologia_informatica_musical",
    "interpretacion_traduccion_lsc_espanol",
    // Ciencias Económicas y Administrativas
    "administracion_deporte",
    "administracion_tecnologica",
    "contaduria_publica",
    "ingenieria_produccion",
    "ingenieria_financiera_negocios",
    "ingenieria_calidad",
    "tecnologia_sistemas_produccion",
    "tecnologia_analisis_costos_presupuestos",
    "tecnologia_calidad",
    "tecnologia_gestion_administrativa",
    // Ciencias Exactas y Aplicadas
    "ciencias_ambientales",
    "ingenieria_biomedica",
    "quimica_industrial",
    "tecnologia_construccion_acabados_arquitectonicos",
    "tecnologia_mantenimiento_equipo_biomedico",
    // Ingenierías
    "ingenieria_sistemas",
    "ingenieria_ciencias_datos",
    "ingenieria_telecomunicaciones",
    "ingenieria_electromecanica",
    "ingenieria_electronica",
    "ingenieria_mecatronica",
    "tecnologia_automatizacion_electronica",
    "tecnologia_sistemas_informacion",
    "tecnologia_sistemas_electromecanicos",
    "tecnologia_gestion_redes_telecomunicaciones",
    "tecnologia_diseno_programacion_software_saas",
    "tecnologia_desarrollo_apps_moviles",
    "tecnologia_desarrollo_software",
    // Opción libre
    "otra",
];

const FAMILIARIDAD: &[&str] = &["nada", "poco", "algo", "bastante", "muy"];
const DEFINICION: &[&str] = &[
    "reglas",
    "aprendizaje",
    "creatividad",
    "razonamiento",
    "no_seguro",
    "otro",
];
const FRECUENCIA: &[&str] = &["nunca", "mensual", "semanal", "varios_dias_semana", "diaria"];
const CONFIANZA: &[&str] = &["nada", "poca", "regular", "bastante", "total"];
const PERCEPCION_SOCIAL: &[&str] = &[
    "muy_negativo",
    "negativo",
    "neutro",
    "positivo",
    "muy_positivo",
];
const REGULACION: &[&str] = &["estricta", "flexible", "libre", "nsnc"];
const EMOCION: &[&str] = &[
    "curiosidad",
    "entusiasmo",
    "indiferencia",
    "inquietud",
    "miedo",
];
const HERRAMIENTAS: &[&str] = &[
    "chatgpt",
    "gemini",
    "copilot",
    "claude",
    "midjourney",
    "dalle",
    "perplexity",
    "leonardo",
    "otra",
];
const USOS: &[&str] = &[
    "estudio",
    "trabajo",
    "programacion",
    "contenido",
    "entretenimiento",
    "diseno",
    "productividad",
    "otra",
];
const SECTORES: &[&str] = &[
    "educacion",
    "salud",
    "tecnologia",
    "arte_medios",
    "finanzas",
    "transporte",
    "gobierno",
    "otro",
];

struct SimpleField {
    name: &'static str,
    allowed: &'static [&'static str],
    /// Companion free-text field required when "otro"/"otra" is chosen.
    other_text: Option<&'static str>,
}

const SIMPLE_FIELDS: &[SimpleField] = &[
    SimpleField {
        name: "facultad",
        allowed: FACULTADES,
        other_text: None,
    },
    SimpleField {
        name: "carrera",
        allowed: CARRERAS,
        other_text: Some("carrera_otro_texto"),
    },
    SimpleField {
        name: "familiaridad",
        allowed: FAMILIARIDAD,
        other_text: None,
    },
    SimpleField {
        name: "definicion",
        allowed: DEFINICION,
        other_text: Some("definicion_otro_texto"),
    },
    SimpleField {
        name: "frecuencia",
        allowed: FRECUENCIA,
        other_text: None,
    },
    SimpleField {
        name: "confianza",
        allowed: CONFIANZA,
        other_text: None,
    },
    SimpleField {
        name: "percepcion_social",
        allowed: PERCEPCION_SOCIAL,
        other_text: None,
    },
    SimpleField {
        name: "regulacion",
        allowed: REGULACION,
        other_text: None,
    },
    SimpleField {
        name: "emocion",
        allowed: EMOCION,
        other_text: None,
    },
];

struct MultiField {
    name: &'static str,
    allowed: &'static [&'static str],
    other_text: &'static str,
}

const MULTI_FIELDS: &[MultiField] = &[
    MultiField {
        name: "herramientas",
        allowed: HERRAMIENTAS,
        other_text: "herramientas_otra_texto",
    },
    MultiField {
        name: "usos",
        allowed: USOS,
        other_text: "usos_otra_texto",
    },
    MultiField {
        name: "sectores",
        allowed: SECTORES,
        other_text: "sectores_otro_texto",
    },
];

/// Every field a deployment of the form may carry.
const KNOWN_FIELDS: &[&str] = &[
    "nombre_completo",
    "edad",
    "facultad",
    "carrera",
    "familiaridad",
    "definicion",
    "frecuencia",
    "confianza",
    "percepcion_social",
    "regulacion",
    "emocion",
    "herramientas",
    "usos",
    "sectores",
];

/// Which fields the deployed form actually contains, declared once instead
/// of probed at every access. Conditional "otro" texts follow their base
/// field.
#[derive(Debug, Clone)]
pub struct FormSchema {
    present: BTreeSet<&'static str>,
}

impl FormSchema {
    /// The full survey as deployed.
    pub fn full() -> Self {
        Self {
            present: KNOWN_FIELDS.iter().copied().collect(),
        }
    }

    /// Restrict to a subset of fields, for partial deployments. Unknown
    /// field names are rejected here, once, rather than surfacing as odd
    /// behavior at submit time.
    pub fn with_fields(fields: &[&str]) -> Result<Self> {
        let mut present = BTreeSet::new();
        for field in fields {
            match KNOWN_FIELDS.iter().find(|k| *k == field) {
                Some(known) => {
                    present.insert(*known);
                }
                None => anyhow::bail!("unknown form field: {field}"),
            }
        }
        Ok(Self { present })
    }

    pub fn has(&self, field: &str) -> bool {
        self.present.contains(field)
    }
}

/// Raw answers as collected, before validation. `None`/empty means the
/// respondent left the field untouched.
#[derive(Debug, Clone, Default)]
pub struct SurveyAnswers {
    pub nombre_completo: Option<String>,
    pub edad: Option<i64>,
    pub facultad: Option<String>,
    pub carrera: Option<String>,
    pub carrera_otro_texto: Option<String>,
    pub familiaridad: Option<String>,
    pub definicion: Option<String>,
    pub definicion_otro_texto: Option<String>,
    pub frecuencia: Option<String>,
    pub confianza: Option<String>,
    pub percepcion_social: Option<String>,
    pub regulacion: Option<String>,
    pub emocion: Option<String>,
    pub herramientas: Vec<String>,
    pub herramientas_otra_texto: Option<String>,
    pub usos: Vec<String>,
    pub usos_otra_texto: Option<String>,
    pub sectores: Vec<String>,
    pub sectores_otro_texto: Option<String>,
}

impl SurveyAnswers {
    fn simple(&self, name: &str) -> Option<&str> {
        match name {
            "facultad" => self.facultad.as_deref(),
            "carrera" => self.carrera.as_deref(),
            "familiaridad" => self.familiaridad.as_deref(),
            "definicion" => self.definicion.as_deref(),
            "frecuencia" => self.frecuencia.as_deref(),
            "confianza" => self.confianza.as_deref(),
            "percepcion_social" => self.percepcion_social.as_deref(),
            "regulacion" => self.regulacion.as_deref(),
            "emocion" => self.emocion.as_deref(),
            _ => None,
        }
    }

    fn multi(&self, name: &str) -> &[String] {
        match name {
            "herramientas" => &self.herramientas,
            "usos" => &self.usos,
            "sectores" => &self.sectores,
            _ => &[],
        }
    }

    fn other_text(&self, name: &str) -> Option<&str> {
        match name {
            "carrera_otro_texto" => self.carrera_otro_texto.as_deref(),
            "definicion_otro_texto" => self.definicion_otro_texto.as_deref(),
            "herramientas_otra_texto" => self.herramientas_otra_texto.as_deref(),
            "usos_otra_texto" => self.usos_otra_texto.as_deref(),
            "sectores_otro_texto" => self.sectores_otro_texto.as_deref(),
            _ => None,
        }
    }
}

/// One failed check, keyed by the field it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn capped(value: &str) -> String {
    truncate_chars(value.trim(), TEXT_MAX).to_string()
}

/// Validate `answers` against `schema` and build the cleaned JSON payload
/// for `POST /api/response`. Only fields the schema declares are checked or
/// emitted; any error means no payload and no network request.
pub fn validate(
    schema: &FormSchema,
    answers: &SurveyAnswers,
) -> std::result::Result<Map<String, Value>, Vec<FieldError>> {
    let mut errors: Vec<FieldError> = Vec::new();
    let mut data = Map::new();

    if schema.has("nombre_completo") {
        match non_empty(answers.nombre_completo.as_deref()) {
            Some(name) if name.chars().count() <= TEXT_MAX => {
                data.insert("nombre_completo".into(), Value::String(name.to_string()));
            }
            _ => errors.push(FieldError::new(
                "nombre_completo",
                "Requerido (1–120 caracteres).",
            )),
        }
    }

    if schema.has("edad") {
        match answers.edad {
            Some(edad) if (EDAD_MIN..=EDAD_MAX).contains(&edad) => {
                data.insert("edad".into(), Value::from(edad));
            }
            _ => errors.push(FieldError::new(
                "edad",
                "Debe ser un entero entre 15 y 99.",
            )),
        }
    }

    for field in SIMPLE_FIELDS {
        if !schema.has(field.name) {
            continue;
        }
        match non_empty(answers.simple(field.name)) {
            None => errors.push(FieldError::new(field.name, "Campo requerido.")),
            Some(value) if !field.allowed.contains(&value) => {
                errors.push(FieldError::new(
                    field.name,
                    format!("Valor inválido: {value}"),
                ));
            }
            Some(value) => {
                data.insert(field.name.into(), Value::String(value.to_string()));
                if let Some(text_field) = field.other_text {
                    check_other_text(
                        matches!(value, "otro" | "otra"),
                        text_field,
                        answers.other_text(text_field),
                        &mut data,
                        &mut errors,
                    );
                }
            }
        }
    }

    for field in MULTI_FIELDS {
        if !schema.has(field.name) {
            continue;
        }
        let chosen = answers.multi(field.name);
        let invalid: Vec<&str> = chosen
            .iter()
            .map(String::as_str)
            .filter(|v| !field.allowed.contains(v))
            .collect();
        if !invalid.is_empty() {
            errors.push(FieldError::new(
                field.name,
                format!("Valores inválidos: {}", invalid.join(", ")),
            ));
            continue;
        }

        // Drop duplicates, keeping first occurrence order.
        let mut seen = BTreeSet::new();
        let cleaned: Vec<Value> = chosen
            .iter()
            .filter(|v| seen.insert(v.as_str()))
            .map(|v| Value::String(v.clone()))
            .collect();
        let chose_other = seen.contains("otro") || seen.contains("otra");
        data.insert(field.name.into(), Value::Array(cleaned));
        check_other_text(
            chose_other,
            field.other_text,
            answers.other_text(field.other_text),
            &mut data,
            &mut errors,
        );
    }

    if errors.is_empty() {
        Ok(data)
    } else {
        Err(errors)
    }
}

/// "Otro" companion text: required when the base answer chose it, kept
/// (capped) whenever provided.
fn check_other_text(
    required: bool,
    text_field: &'static str,
    value: Option<&str>,
    data: &mut Map<String, Value>,
    errors: &mut Vec<FieldError>,
) {
    match non_empty(value) {
        Some(text) => {
            data.insert(text_field.into(), Value::String(capped(text)));
        }
        None if required => errors.push(FieldError::new(
            text_field,
            "Requerido cuando se elige 'otro/otra'.",
        )),
        None => {}
    }
}

/// Outcome of one submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Stored by the backend.
    Accepted,
    /// Failed client-side validation; no request was issued.
    Invalid(Vec<FieldError>),
    /// The backend answered with a well-formed failure payload.
    Rejected(String),
    /// Transport failure or malformed backend response.
    Failed(String),
}

/// Validate, then POST the cleaned payload. Validation failure short-
/// circuits before any network activity.
pub async fn submit(
    schema: &FormSchema,
    answers: &SurveyAnswers,
    backend: &dyn Backend,
) -> SubmitOutcome {
    let payload = match validate(schema, answers) {
        Ok(payload) => payload,
        Err(errors) => {
            debug!(fields = errors.len(), "submission rejected client-side");
            return SubmitOutcome::Invalid(errors);
        }
    };

    match backend.submit_response(&Value::Object(payload)).await {
        Ok(ApiResult { ok: true, .. }) => {
            info!("survey response stored");
            SubmitOutcome::Accepted
        }
        Ok(result) => {
            let detail = describe_rejection(&result);
            warn!(detail = %detail, "survey response rejected by backend");
            SubmitOutcome::Rejected(detail)
        }
        Err(err) => {
            let message = format!("{err:#}");
            warn!(error = %message, "survey submission failed");
            SubmitOutcome::Failed(truncate_chars(&message, 200).to_string())
        }
    }
}

fn describe_rejection(result: &ApiResult) -> String {
    if let Some(errors) = &result.errors {
        return errors.to_string();
    }
    result
        .error
        .clone()
        .unwrap_or_else(|| "desconocido".to_string())
}
