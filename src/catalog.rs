use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select,
    sea_query::{Expr, Order, SimpleExpr},
};
use tracing::debug;

use crate::{
    entities::{country, film, film_country, film_genre, film_writer, genre, person, role, trailer, writer},
    error::{AppError, AppResult},
    models::{CastMember, Movie, MovieSummary, NameSuggestion, PagedResult, SearchCriteria},
    search,
};

#[derive(Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn search_films(
        &self,
        criteria: &SearchCriteria,
    ) -> AppResult<PagedResult<MovieSummary>> {
        let criteria = criteria.normalized();
        let per_page = criteria.per_page.max(1);
        let page = criteria.page.max(1);
        if (page - 1).checked_mul(per_page).is_none() {
            return Err(AppError::Validation("page out of range".into()));
        }

        let paginator = film::Entity::find()
            .filter(search::film_condition(&criteria))
            .order_by_asc(film::Column::Title)
            .order_by_asc(film::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let items: Vec<MovieSummary> =
            paginator.fetch_page(page - 1).await?.into_iter().map(MovieSummary::from).collect();

        debug!(total, page, per_page, returned = items.len(), "searched films");

        Ok(PagedResult::new(items, total, page, per_page))
    }

    pub async fn get_film_by_id(&self, film_id: i32) -> AppResult<Option<Movie>> {
        let Some(film) = film::Entity::find_by_id(film_id).one(&self.db).await? else {
            return Ok(None);
        };

        let (genres, countries, writers, cast, trailers) = futures::try_join!(
            self.genre_names(film_id),
            self.country_names(film_id),
            self.writer_names(film_id),
            self.cast(film_id),
            self.trailer_urls(film_id),
        )?;

        Ok(Some(Movie {
            id: film.id,
            title: film.title,
            year: film.year,
            language: film.language,
            duration: film.duration,
            summary: film.summary,
            poster_url: film.poster_url,
            director_id: film.director_id,
            genres,
            countries,
            writers,
            cast,
            trailers,
        }))
    }

    pub async fn get_trailer_by_id(&self, film_id: i32) -> AppResult<Option<String>> {
        let url = trailer::Entity::find()
            .select_only()
            .column(trailer::Column::Url)
            .filter(trailer::Column::FilmId.eq(film_id))
            .order_by_asc(trailer::Column::Id)
            .into_tuple::<String>()
            .one(&self.db)
            .await?;
        Ok(url)
    }

    pub async fn get_genres(&self) -> AppResult<Vec<String>> {
        let names = genre::Entity::find()
            .select_only()
            .column(genre::Column::Name)
            .distinct()
            .order_by_asc(genre::Column::Name)
            .into_tuple::<String>()
            .all(&self.db)
            .await?;
        Ok(names)
    }

    pub async fn get_films_by_writer(&self, name: &str) -> AppResult<Vec<MovieSummary>> {
        let films = film::Entity::find()
            .filter(search::writer_named(name.trim()))
            .order_by_asc(film::Column::Title)
            .all(&self.db)
            .await?;
        Ok(films.into_iter().map(MovieSummary::from).collect())
    }

    pub async fn get_suggestion(&self, term: &str, limit: u64) -> AppResult<Vec<NameSuggestion>> {
        self.suggest(
            film::Entity::find(),
            Expr::col((film::Entity, film::Column::Id)).into(),
            Expr::col((film::Entity, film::Column::Title)).into(),
            term,
            limit,
        )
        .await
    }

    pub async fn get_actor_suggestions(
        &self,
        term: &str,
        limit: u64,
    ) -> AppResult<Vec<NameSuggestion>> {
        self.suggest(
            person::Entity::find().filter(search::has_role()),
            Expr::col((person::Entity, person::Column::Id)).into(),
            Expr::col((person::Entity, person::Column::Name)).into(),
            term,
            limit,
        )
        .await
    }

    pub async fn get_writer_suggestions(
        &self,
        term: &str,
        limit: u64,
    ) -> AppResult<Vec<NameSuggestion>> {
        self.suggest(
            writer::Entity::find(),
            Expr::col((writer::Entity, writer::Column::Id)).into(),
            Expr::col((writer::Entity, writer::Column::Name)).into(),
            term,
            limit,
        )
        .await
    }

    async fn suggest<E: EntityTrait>(
        &self,
        select: Select<E>,
        id: SimpleExpr,
        name: SimpleExpr,
        term: &str,
        limit: u64,
    ) -> AppResult<Vec<NameSuggestion>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let suggestions = select
            .select_only()
            .column_as(id, "id")
            .column_as(name.clone(), "name")
            .filter(search::name_matches(name.clone(), term))
            .order_by(search::suggestion_rank(name.clone(), term), Order::Asc)
            .order_by(search::name_length(name.clone()), Order::Asc)
            .order_by(name, Order::Asc)
            .limit(limit)
            .into_model::<NameSuggestion>()
            .all(&self.db)
            .await?;

        debug!(term, found = suggestions.len(), "name suggestions");
        Ok(suggestions)
    }

    async fn genre_names(&self, film_id: i32) -> Result<Vec<String>, DbErr> {
        film_genre::Entity::find()
            .select_only()
            .column(genre::Column::Name)
            .join(JoinType::InnerJoin, film_genre::Relation::Genre.def())
            .filter(film_genre::Column::FilmId.eq(film_id))
            .order_by_asc(genre::Column::Name)
            .into_tuple()
            .all(&self.db)
            .await
    }

    async fn country_names(&self, film_id: i32) -> Result<Vec<String>, DbErr> {
        film_country::Entity::find()
            .select_only()
            .column(country::Column::Name)
            .join(JoinType::InnerJoin, film_country::Relation::Country.def())
            .filter(film_country::Column::FilmId.eq(film_id))
            .order_by_asc(country::Column::Name)
            .into_tuple()
            .all(&self.db)
            .await
    }

    async fn writer_names(&self, film_id: i32) -> Result<Vec<String>, DbErr> {
        film_writer::Entity::find()
            .select_only()
            .column(writer::Column::Name)
            .join(JoinType::InnerJoin, film_writer::Relation::Writer.def())
            .filter(film_writer::Column::FilmId.eq(film_id))
            .order_by_asc(writer::Column::Name)
            .into_tuple()
            .all(&self.db)
            .await
    }

    async fn cast(&self, film_id: i32) -> Result<Vec<CastMember>, DbErr> {
        role::Entity::find()
            .select_only()
            .column_as(person::Column::Id, "id")
            .column_as(person::Column::Name, "name")
            .column_as(role::Column::Character, "character")
            .join(JoinType::InnerJoin, role::Relation::Person.def())
            .filter(role::Column::FilmId.eq(film_id))
            .order_by_asc(role::Column::Id)
            .into_model::<CastMember>()
            .all(&self.db)
            .await
    }

    async fn trailer_urls(&self, film_id: i32) -> Result<Vec<String>, DbErr> {
        trailer::Entity::find()
            .select_only()
            .column(trailer::Column::Url)
            .filter(trailer::Column::FilmId.eq(film_id))
            .order_by_asc(trailer::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await
    }
}
