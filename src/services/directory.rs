//! Worker directory: equality filters, free-text search and ordering over the
//! full list of workers.

use serde::Deserialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use rocket_okapi::okapi::schemars;
use rocket_okapi::okapi::schemars::JsonSchema;

use crate::models::User;

/// Filter value meaning "any".
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromFormField, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    #[field(value = "rating")]
    Rating,
    #[field(value = "name")]
    Name,
}

#[derive(Debug, Default, FromForm, Deserialize, JsonSchema)]
pub struct WorkerQuery {
    pub area: Option<String>,
    pub locality: Option<String>,
    pub specialty: Option<String>,
    pub q: Option<String>,
    pub sort: Option<SortBy>,
}

fn active(filter: &Option<String>) -> Option<&str> {
    filter
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != ALL)
}

fn matches(user: &User, query: &WorkerQuery) -> bool {
    let Some(worker) = user.worker() else {
        return false;
    };

    if let Some(area) = active(&query.area) {
        if worker.work_area != area {
            return false;
        }
    }

    if let Some(locality) = active(&query.locality) {
        if user.locality != locality {
            return false;
        }
    }

    if let Some(specialty) = active(&query.specialty) {
        if !worker.specialties.iter().any(|s| s == specialty) {
            return false;
        }
    }

    if let Some(text) = query.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let needle = text.to_lowercase();
        let in_name = user.full_name().to_lowercase().contains(&needle);
        let in_specialties = worker
            .specialties
            .iter()
            .any(|s| s.to_lowercase().contains(&needle));
        if !in_name && !in_specialties {
            return false;
        }
    }

    true
}

/// Collation key for name ordering: accents stripped, case folded.
fn name_key(user: &User) -> String {
    user.full_name()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Returns the workers matching every active filter, ordered by `query.sort`.
/// Both orderings are stable.
pub fn search(workers: Vec<User>, query: &WorkerQuery) -> Vec<User> {
    let mut found: Vec<User> = workers.into_iter().filter(|w| matches(w, query)).collect();

    match query.sort.unwrap_or_default() {
        SortBy::Rating => found.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortBy::Name => found.sort_by_cached_key(|user| (name_key(user), user.full_name())),
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmployerDetails, RoleProfile, WorkerDetails, DEFAULT_PHOTO};
    use mongodb::bson::{oid::ObjectId, DateTime};

    fn worker(name: &str, surname: &str, area: &str, locality: &str, rating: f64, specialties: &[&str]) -> User {
        User {
            id: Some(ObjectId::new()),
            name: name.to_string(),
            surname: surname.to_string(),
            national_id: "11.111.111-1".to_string(),
            address: "Calle 1".to_string(),
            email: format!("{}@example.cl", name.to_lowercase()),
            password_hash: String::new(),
            photo: DEFAULT_PHOTO.to_string(),
            locality: locality.to_string(),
            biography: String::new(),
            rating,
            review_count: 0,
            rating_total: 0,
            profile: RoleProfile::Worker(WorkerDetails {
                specialties: specialties.iter().map(|s| s.to_string()).collect(),
                bank: "Banco Estado".to_string(),
                work_area: area.to_string(),
                ..Default::default()
            }),
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    fn names(users: &[User]) -> Vec<String> {
        users.iter().map(User::full_name).collect()
    }

    fn sample() -> Vec<User> {
        vec![
            worker("Ana", "Soto", "Limpieza", "Providencia", 4.5, &["Limpieza profunda"]),
            worker("Bob", "Reyes", "Jardinería", "Ñuñoa", 4.8, &["Poda de árboles", "Riego"]),
            worker("Carla", "Díaz", "Limpieza", "Ñuñoa", 4.5, &["Limpieza general"]),
            worker("Diego", "Araya", "Reparaciones", "Providencia", 3.9, &["Plomería"]),
        ]
    }

    #[test]
    fn area_filter_from_the_example() {
        let list = vec![
            worker("Ana", "Soto", "Limpieza", "Providencia", 4.5, &[]),
            worker("Bob", "Reyes", "Jardinería", "Providencia", 4.8, &[]),
        ];

        let query = WorkerQuery {
            area: Some("Limpieza".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&search(list.clone(), &query)), vec!["Ana Soto"]);

        let by_rating = search(list, &WorkerQuery::default());
        assert_eq!(names(&by_rating), vec!["Bob Reyes", "Ana Soto"]);
    }

    #[test]
    fn rating_sort_is_stable_for_ties() {
        let sorted = search(sample(), &WorkerQuery::default());
        assert_eq!(
            names(&sorted),
            vec!["Bob Reyes", "Ana Soto", "Carla Díaz", "Diego Araya"]
        );
    }

    #[test]
    fn name_sort_is_ascending() {
        let query = WorkerQuery {
            sort: Some(SortBy::Name),
            ..Default::default()
        };
        assert_eq!(
            names(&search(sample(), &query)),
            vec!["Ana Soto", "Bob Reyes", "Carla Díaz", "Diego Araya"]
        );
    }

    #[test]
    fn name_sort_ignores_accents_and_case() {
        let list = vec![
            worker("Bruno", "Díaz", "Limpieza", "Providencia", 4.0, &[]),
            worker("Álvaro", "Pérez", "Limpieza", "Providencia", 4.0, &[]),
            worker("ana", "Soto", "Limpieza", "Providencia", 4.0, &[]),
            worker("Óscar", "Reyes", "Limpieza", "Providencia", 4.0, &[]),
        ];
        let query = WorkerQuery {
            sort: Some(SortBy::Name),
            ..Default::default()
        };
        assert_eq!(
            names(&search(list, &query)),
            vec!["Álvaro Pérez", "ana Soto", "Bruno Díaz", "Óscar Reyes"]
        );
    }

    #[test]
    fn all_and_blank_mean_no_filter() {
        let query = WorkerQuery {
            area: Some(ALL.to_string()),
            locality: Some("  ".to_string()),
            specialty: Some(ALL.to_string()),
            q: Some(String::new()),
            sort: None,
        };
        assert_eq!(search(sample(), &query).len(), 4);
    }

    #[test]
    fn filters_combine() {
        let query = WorkerQuery {
            area: Some("Limpieza".to_string()),
            locality: Some("Ñuñoa".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&search(sample(), &query)), vec!["Carla Díaz"]);
    }

    #[test]
    fn specialty_is_an_exact_element_match() {
        let query = WorkerQuery {
            specialty: Some("Riego".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&search(sample(), &query)), vec!["Bob Reyes"]);

        let partial = WorkerQuery {
            specialty: Some("Rieg".to_string()),
            ..Default::default()
        };
        assert!(search(sample(), &partial).is_empty());
    }

    #[test]
    fn free_text_matches_name_or_specialty_ignoring_case() {
        let by_name = WorkerQuery {
            q: Some("ana so".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&search(sample(), &by_name)), vec!["Ana Soto"]);

        let by_specialty = WorkerQuery {
            q: Some("LIMPIEZA".to_string()),
            ..Default::default()
        };
        assert_eq!(
            names(&search(sample(), &by_specialty)),
            vec!["Ana Soto", "Carla Díaz"]
        );
    }

    #[test]
    fn no_matches_is_an_empty_list() {
        let query = WorkerQuery {
            area: Some("Mudanzas".to_string()),
            ..Default::default()
        };
        assert!(search(sample(), &query).is_empty());
    }

    #[test]
    fn results_are_a_subset_satisfying_every_filter() {
        let areas = [None, Some("Limpieza"), Some("Jardinería")];
        let localities = [None, Some("Providencia"), Some("Ñuñoa")];
        let texts = [None, Some("a"), Some("poda")];

        for area in areas {
            for locality in localities {
                for text in texts {
                    let query = WorkerQuery {
                        area: area.map(String::from),
                        locality: locality.map(String::from),
                        q: text.map(String::from),
                        ..Default::default()
                    };
                    let input = sample();
                    let ids: Vec<_> = input.iter().map(|u| u.id).collect();

                    for found in search(input, &query) {
                        assert!(ids.contains(&found.id));
                        let details = found.worker().unwrap();
                        if let Some(area) = area {
                            assert_eq!(details.work_area, area);
                        }
                        if let Some(locality) = locality {
                            assert_eq!(found.locality, locality);
                        }
                        if let Some(text) = text {
                            let needle = text.to_lowercase();
                            assert!(
                                found.full_name().to_lowercase().contains(&needle)
                                    || details
                                        .specialties
                                        .iter()
                                        .any(|s| s.to_lowercase().contains(&needle))
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn employers_never_appear() {
        let mut list = sample();
        let mut employer = list[0].clone();
        employer.profile = RoleProfile::Employer(EmployerDetails::default());
        list.push(employer);

        assert_eq!(search(list, &WorkerQuery::default()).len(), 4);
    }
}
