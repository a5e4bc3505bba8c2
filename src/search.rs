use sea_orm::{
    Condition,
    sea_query::{Expr, Func, Query, SelectStatement, SimpleExpr},
};

use crate::{
    entities::{film, film_genre, film_writer, genre, person, role, writer},
    models::SearchCriteria,
};

const LIKE_ESCAPE: char = '!';

impl SearchCriteria {
    /// Trims text predicates, drops blank ones and sorts/dedups list predicates
    /// so that equivalent searches compare (and serialize) equal.
    pub fn normalized(&self) -> SearchCriteria {
        SearchCriteria {
            title: non_blank(&self.title),
            language: non_blank(&self.language),
            summary: non_blank(&self.summary),
            genres_included: normalize_list(&self.genres_included),
            genres_excluded: normalize_list(&self.genres_excluded),
            writers: normalize_list(&self.writers),
            actors: normalize_list(&self.actors),
            ..self.clone()
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

fn normalize_list(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> =
        values.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).map(str::to_owned).collect();
    out.sort();
    out.dedup();
    out
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

// Both sides go through SQLite's UPPER so non-ASCII text folds the same way
// on the column and on the bound value.
fn like(value: impl Into<SimpleExpr>, pattern: String) -> SimpleExpr {
    Expr::cust_with_exprs(
        format!("UPPER($1) LIKE UPPER($2) ESCAPE '{LIKE_ESCAPE}'"),
        [value.into(), Expr::val(pattern).into()],
    )
}

fn contains(value: impl Into<SimpleExpr>, term: &str) -> SimpleExpr {
    like(value, format!("%{}%", escape_like(term)))
}

fn equals_ignoring_case(value: impl Into<SimpleExpr>, term: &str) -> SimpleExpr {
    Expr::expr(Func::upper(value)).eq(Func::upper(Expr::val(term)))
}

fn film_id() -> Expr {
    Expr::col((film::Entity, film::Column::Id))
}

/// Builds the WHERE clause for a catalog search. All user input is bound as
/// parameters; an empty criteria set yields an empty (match-all) condition.
pub fn film_condition(criteria: &SearchCriteria) -> Condition {
    let mut cond = Condition::all();

    if let Some(title) = &criteria.title {
        cond = cond.add(contains(Expr::col((film::Entity, film::Column::Title)), title));
    }
    if let Some(min) = criteria.year_min {
        cond = cond.add(Expr::col((film::Entity, film::Column::Year)).gte(min));
    }
    if let Some(max) = criteria.year_max {
        cond = cond.add(Expr::col((film::Entity, film::Column::Year)).lte(max));
    }
    if let Some(language) = &criteria.language {
        cond = cond
            .add(equals_ignoring_case(Expr::col((film::Entity, film::Column::Language)), language));
    }
    if let Some(min) = criteria.duration_min {
        cond = cond.add(Expr::col((film::Entity, film::Column::Duration)).gte(min));
    }
    if let Some(max) = criteria.duration_max {
        cond = cond.add(Expr::col((film::Entity, film::Column::Duration)).lte(max));
    }
    if let Some(summary) = &criteria.summary {
        cond = cond.add(contains(Expr::col((film::Entity, film::Column::Summary)), summary));
    }

    for name in &criteria.genres_included {
        cond = cond.add(Expr::exists(tagged_with(name)));
    }
    for name in &criteria.genres_excluded {
        cond = cond.add(Condition::all().add(Expr::exists(tagged_with(name))).not());
    }
    for name in &criteria.writers {
        let matches = contains(Expr::col((writer::Entity, writer::Column::Name)), name);
        cond = cond.add(Expr::exists(written_by(matches)));
    }
    for name in &criteria.actors {
        let matches = contains(Expr::col((person::Entity, person::Column::Name)), name);
        cond = cond.add(Expr::exists(played_by(matches)));
    }

    cond
}

/// Films written by a writer whose name equals `name`, ignoring case.
pub fn writer_named(name: &str) -> Condition {
    let matches = equals_ignoring_case(Expr::col((writer::Entity, writer::Column::Name)), name);
    Condition::all().add(Expr::exists(written_by(matches)))
}

/// People credited with at least one role.
pub fn has_role() -> Condition {
    Condition::all().add(Expr::exists(
        Query::select()
            .expr(Expr::val(1))
            .from(role::Entity)
            .and_where(
                Expr::col((role::Entity, role::Column::PersonId))
                    .equals((person::Entity, person::Column::Id)),
            )
            .to_owned(),
    ))
}

fn tagged_with(genre_name: &str) -> SelectStatement {
    Query::select()
        .expr(Expr::val(1))
        .from(film_genre::Entity)
        .inner_join(
            genre::Entity,
            Expr::col((genre::Entity, genre::Column::Id))
                .equals((film_genre::Entity, film_genre::Column::GenreId)),
        )
        .and_where(film_id().equals((film_genre::Entity, film_genre::Column::FilmId)))
        .and_where(equals_ignoring_case(
            Expr::col((genre::Entity, genre::Column::Name)),
            genre_name,
        ))
        .to_owned()
}

fn written_by(name_matches: SimpleExpr) -> SelectStatement {
    Query::select()
        .expr(Expr::val(1))
        .from(film_writer::Entity)
        .inner_join(
            writer::Entity,
            Expr::col((writer::Entity, writer::Column::Id))
                .equals((film_writer::Entity, film_writer::Column::WriterId)),
        )
        .and_where(film_id().equals((film_writer::Entity, film_writer::Column::FilmId)))
        .and_where(name_matches)
        .to_owned()
}

fn played_by(name_matches: SimpleExpr) -> SelectStatement {
    Query::select()
        .expr(Expr::val(1))
        .from(role::Entity)
        .inner_join(
            person::Entity,
            Expr::col((person::Entity, person::Column::Id))
                .equals((role::Entity, role::Column::PersonId)),
        )
        .and_where(film_id().equals((role::Entity, role::Column::FilmId)))
        .and_where(name_matches)
        .to_owned()
}

pub fn name_matches(name: SimpleExpr, term: &str) -> SimpleExpr {
    contains(name, term)
}

/// Suggestion tier: 1 when the name starts with the term, 2 when the term is
/// a whole word further into the name, 3 for any other occurrence.
pub fn suggestion_rank(name: SimpleExpr, term: &str) -> SimpleExpr {
    let term = escape_like(term);
    Expr::case(like(name.clone(), format!("{term}%")), Expr::val(1))
        .case(
            Condition::any()
                .add(like(name.clone(), format!("% {term} %")))
                .add(like(name, format!("% {term}"))),
            Expr::val(2),
        )
        .finally(Expr::val(3))
        .into()
}

pub fn name_length(name: SimpleExpr) -> SimpleExpr {
    Func::char_length(name).into()
}
