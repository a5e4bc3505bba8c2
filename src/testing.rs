use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::{
    config::Config,
    db,
    entities::{
        country, film, film_country, film_genre, film_writer, genre, person, role, trailer, writer,
    },
};

pub(crate) async fn memory_db() -> DatabaseConnection {
    db::connect_and_migrate("sqlite::memory:", 1).await.unwrap()
}

pub(crate) fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        database_max_connections: 1,
        jwt_secret: "test-secret".to_string(),
        token_ttl_minutes: 30,
        cache_ttl_minutes: 30,
        rental_cost: 10,
        signup_credits: 0,
        login_rps: 1000,
    }
}

pub(crate) struct Catalog {
    pub alien: i32,
    pub aliens: i32,
    pub die_hard: i32,
    pub matrix: i32,
    pub amelie: i32,
    pub star_wars: i32,
    pub war_story: i32,
    pub warfare: i32,
}

pub(crate) const TITLES_IN_ORDER: [&str; 8] = [
    "A War Story",
    "Alien",
    "Aliens",
    "Amélie",
    "Die Hard",
    "Star Wars",
    "The Matrix",
    "Warfare",
];

pub(crate) async fn seed_catalog(db: &DatabaseConnection) -> Catalog {
    let alien = insert_film(db, "Alien", 1979, "English", 117, None).await;
    tag(db, alien, &["Horror", "Science Fiction"]).await;
    credit_writers(db, alien, &["Dan O'Bannon"]).await;
    cast(db, alien, "Sigourney Weaver", "Ellen Ripley").await;

    let aliens = insert_film(db, "Aliens", 1986, "English", 137, None).await;
    tag(db, aliens, &["Action", "Horror", "Science Fiction"]).await;
    credit_writers(db, aliens, &["James Cameron"]).await;
    cast(db, aliens, "Sigourney Weaver", "Ellen Ripley").await;

    let die_hard = insert_film(db, "Die Hard", 1988, "English", 132, None).await;
    tag(db, die_hard, &["Action"]).await;
    credit_writers(db, die_hard, &["Jeb Stuart"]).await;
    cast(db, die_hard, "Bruce Willis", "John McClane").await;

    let matrix = insert_film(
        db,
        "The Matrix",
        1999,
        "English",
        136,
        Some("A hacker learns the true nature of his reality."),
    )
    .await;
    tag(db, matrix, &["Science Fiction", "Action"]).await;
    credit_writers(db, matrix, &["Lilly Wachowski", "Lana Wachowski"]).await;
    cast(db, matrix, "Keanu Reeves", "Neo").await;
    cast(db, matrix, "Laurence Fishburne", "Morpheus").await;
    produced_in(db, matrix, &["United States", "Australia"]).await;
    add_trailer(db, matrix, "https://trailers.example/matrix-1").await;
    add_trailer(db, matrix, "https://trailers.example/matrix-2").await;

    let amelie = insert_film(db, "Amélie", 2001, "French", 122, None).await;
    tag(db, amelie, &["Comedy", "Romance"]).await;
    credit_writers(db, amelie, &["Guillaume Laurent"]).await;
    produced_in(db, amelie, &["France"]).await;

    let star_wars = insert_film(db, "Star Wars", 1977, "English", 121, None).await;
    tag(db, star_wars, &["Science Fiction"]).await;
    credit_writers(db, star_wars, &["George Lucas"]).await;
    cast(db, star_wars, "Mark Hamill", "Luke Skywalker").await;

    let war_story = insert_film(db, "A War Story", 2015, "English", 95, None).await;
    tag(db, war_story, &["Drama"]).await;

    let warfare = insert_film(db, "Warfare", 2025, "English", 95, None).await;
    tag(db, warfare, &["Action"]).await;

    Catalog { alien, aliens, die_hard, matrix, amelie, star_wars, war_story, warfare }
}

pub(crate) async fn insert_film(
    db: &DatabaseConnection,
    title: &str,
    year: i32,
    language: &str,
    duration: i32,
    summary: Option<&str>,
) -> i32 {
    film::ActiveModel {
        title: Set(title.to_string()),
        year: Set(Some(year)),
        language: Set(Some(language.to_string())),
        duration: Set(Some(duration)),
        summary: Set(summary.map(str::to_string)),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub(crate) async fn tag(db: &DatabaseConnection, film_id: i32, genres: &[&str]) {
    for name in genres {
        let genre_id = match genre::Entity::find()
            .filter(genre::Column::Name.eq(*name))
            .one(db)
            .await
            .unwrap()
        {
            Some(existing) => existing.id,
            None => {
                genre::ActiveModel { name: Set(name.to_string()), ..Default::default() }
                    .insert(db)
                    .await
                    .unwrap()
                    .id
            }
        };
        film_genre::Entity::insert(film_genre::ActiveModel {
            film_id: Set(film_id),
            genre_id: Set(genre_id),
        })
        .exec_without_returning(db)
        .await
        .unwrap();
    }
}

async fn credit_writers(db: &DatabaseConnection, film_id: i32, names: &[&str]) {
    for name in names {
        let writer_id = match writer::Entity::find()
            .filter(writer::Column::Name.eq(*name))
            .one(db)
            .await
            .unwrap()
        {
            Some(existing) => existing.id,
            None => {
                writer::ActiveModel { name: Set(name.to_string()), ..Default::default() }
                    .insert(db)
                    .await
                    .unwrap()
                    .id
            }
        };
        film_writer::Entity::insert(film_writer::ActiveModel {
            film_id: Set(film_id),
            writer_id: Set(writer_id),
        })
        .exec_without_returning(db)
        .await
        .unwrap();
    }
}

async fn produced_in(db: &DatabaseConnection, film_id: i32, names: &[&str]) {
    for name in names {
        let country_id =
            country::ActiveModel { name: Set(name.to_string()), ..Default::default() }
                .insert(db)
                .await
                .unwrap()
                .id;
        film_country::Entity::insert(film_country::ActiveModel {
            film_id: Set(film_id),
            country_id: Set(country_id),
        })
        .exec_without_returning(db)
        .await
        .unwrap();
    }
}

async fn cast(db: &DatabaseConnection, film_id: i32, name: &str, character: &str) {
    let person_id = match person::Entity::find()
        .filter(person::Column::Name.eq(name))
        .one(db)
        .await
        .unwrap()
    {
        Some(existing) => existing.id,
        None => {
            person::ActiveModel { name: Set(name.to_string()), ..Default::default() }
                .insert(db)
                .await
                .unwrap()
                .id
        }
    };
    role::ActiveModel {
        film_id: Set(film_id),
        person_id: Set(person_id),
        character: Set(Some(character.to_string())),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
}

async fn add_trailer(db: &DatabaseConnection, film_id: i32, url: &str) {
    trailer::ActiveModel { film_id: Set(film_id), url: Set(url.to_string()), ..Default::default() }
        .insert(db)
        .await
        .unwrap();
}
