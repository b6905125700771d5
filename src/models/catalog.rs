use serde::Serialize;
use rocket_okapi::okapi::schemars;
use rocket_okapi::okapi::schemars::JsonSchema;

pub const AREAS: &[&str] = &[
    "Jardinería",
    "Reparaciones",
    "Limpieza",
    "Pintura",
    "Mudanzas",
    "Mantenimiento",
];

pub const LOCALITIES: &[&str] = &[
    "Santiago Centro",
    "Providencia",
    "Las Condes",
    "Ñuñoa",
    "La Florida",
    "Puente Alto",
    "Maipú",
    "Vitacura",
    "Lo Barnechea",
    "Independencia",
];

pub const JOBS_BY_AREA: &[(&str, &[&str])] = &[
    (
        "Jardinería",
        &[
            "Corte de pasto",
            "Poda de árboles",
            "Riego",
            "Diseño de jardines",
            "Mantención de áreas verdes",
        ],
    ),
    (
        "Reparaciones",
        &["Plomería", "Electricidad", "Carpintería", "Gasfitería", "Cerrajería"],
    ),
    (
        "Limpieza",
        &[
            "Limpieza general",
            "Limpieza profunda",
            "Lavado de alfombras",
            "Organización de espacios",
        ],
    ),
    (
        "Pintura",
        &[
            "Pintura interior",
            "Pintura exterior",
            "Empaste y lijado",
            "Reparación de muros",
        ],
    ),
    (
        "Mudanzas",
        &["Empaque", "Transporte", "Armado de muebles", "Desarme de muebles"],
    ),
    (
        "Mantenimiento",
        &[
            "Mantención preventiva",
            "Instalación de artefactos",
            "Sellos y siliconas",
        ],
    ),
];

pub fn is_known_area(area: &str) -> bool {
    AREAS.contains(&area)
}

pub fn is_known_locality(locality: &str) -> bool {
    LOCALITIES.contains(&locality)
}

/// Entries of `specialties` that are not jobs of `area`.
pub fn unknown_specialties<'a>(area: &str, specialties: &'a [String]) -> Vec<&'a str> {
    let jobs = jobs_for(Some(area));
    specialties
        .iter()
        .map(String::as_str)
        .filter(|s| !jobs.iter().any(|job| job == s))
        .collect()
}

/// Specific jobs offered in `area`, or every job when `area` is `None`.
pub fn jobs_for(area: Option<&str>) -> Vec<&'static str> {
    JOBS_BY_AREA
        .iter()
        .filter(|(name, _)| area.is_none_or(|a| a == *name))
        .flat_map(|(_, jobs)| jobs.iter().copied())
        .collect()
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AreaJobs {
    pub area: String,
    pub jobs: Vec<String>,
}

pub fn area_jobs() -> Vec<AreaJobs> {
    JOBS_BY_AREA
        .iter()
        .map(|(area, jobs)| AreaJobs {
            area: area.to_string(),
            jobs: jobs.iter().map(|j| j.to_string()).collect(),
        })
        .collect()
}
