use jiff::civil::Date;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::entities::{client, film};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub summary: Option<String>,
    pub poster_url: Option<String>,
    pub language: Option<String>,
    pub duration: Option<i32>,
}

impl From<film::Model> for MovieSummary {
    fn from(film: film::Model) -> Self {
        Self {
            id: film.id,
            title: film.title,
            year: film.year,
            summary: film.summary,
            poster_url: film.poster_url,
            language: film.language,
            duration: film.duration,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct CastMember {
    pub id: i32,
    pub name: String,
    pub character: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub language: Option<String>,
    pub duration: Option<i32>,
    pub summary: Option<String>,
    pub poster_url: Option<String>,
    pub director_id: Option<i32>,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
    pub writers: Vec<String>,
    pub cast: Vec<CastMember>,
    pub trailers: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, per_page: u64) -> Self {
        Self { items, total, page, per_page, total_pages: total.div_ceil(per_page.max(1)) }
    }
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    10
}

/// Filter predicates for a catalog search. Every active predicate is ANDed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_ranges"))]
pub struct SearchCriteria {
    pub title: Option<String>,
    #[validate(range(min = 1888, max = 2100))]
    pub year_min: Option<i32>,
    #[validate(range(min = 1888, max = 2100))]
    pub year_max: Option<i32>,
    pub language: Option<String>,
    #[validate(range(min = 1))]
    pub duration_min: Option<i32>,
    #[validate(range(min = 1))]
    pub duration_max: Option<i32>,
    pub summary: Option<String>,
    pub genres_included: Vec<String>,
    pub genres_excluded: Vec<String>,
    pub writers: Vec<String>,
    pub actors: Vec<String>,
    #[validate(range(min = 1, max = 1_000_000))]
    pub page: u64,
    #[serde(alias = "limit")]
    #[validate(range(min = 1, max = 100))]
    pub per_page: u64,
}

fn validate_ranges(criteria: &SearchCriteria) -> Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (criteria.year_min, criteria.year_max) {
        if min > max {
            return Err(ValidationError::new("year_range"));
        }
    }
    if let (Some(min), Some(max)) = (criteria.duration_min, criteria.duration_max) {
        if min > max {
            return Err(ValidationError::new("duration_range"));
        }
    }
    Ok(())
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            title: None,
            year_min: None,
            year_max: None,
            language: None,
            duration_min: None,
            duration_max: None,
            summary: None,
            genres_included: Vec::new(),
            genres_excluded: Vec::new(),
            writers: Vec::new(),
            actors: Vec::new(),
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct NameSuggestion {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<Date>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub plan: Option<String>,
    pub credits: i32,
}

impl From<client::Model> for Profile {
    fn from(client: client::Model) -> Self {
        Self {
            last_name: client.last_name,
            first_name: client.first_name,
            email: client.email,
            phone: client.phone,
            birth_date: client.birth_date.and_then(|d| d.parse().ok()),
            address: client.address,
            city: client.city,
            province: client.province,
            postal_code: client.postal_code,
            plan: client.plan,
            credits: client.credits,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct Registration {
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(email, length(max = 100))]
    pub email: String,
    #[validate(length(min = 8, max = 100))]
    pub password: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub birth_date: Option<Date>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 2))]
    pub province: Option<String>,
    #[validate(length(max = 7))]
    pub postal_code: Option<String>,
    #[validate(length(max = 1))]
    pub plan: Option<String>,
}

/// Partial profile update; `None` fields keep their stored value.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 8, max = 100))]
    pub password: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub birth_date: Option<Date>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 2))]
    pub province: Option<String>,
    #[validate(length(max = 7))]
    pub postal_code: Option<String>,
    #[validate(length(max = 1))]
    pub plan: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct CreditAdjustment {
    #[validate(range(min = 1, max = 10_000))]
    pub amount: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreditBalance {
    pub credits: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrailerLink {
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NameSuggestions {
    pub suggestions: Vec<NameSuggestion>,
}
