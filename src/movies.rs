use std::sync::Arc;

use tracing::debug;
use validator::Validate;

use crate::{
    cache::Cache,
    catalog::CatalogRepository,
    error::AppResult,
    models::{Movie, MovieSummary, NameSuggestion, PagedResult, SearchCriteria},
};

pub const SUGGESTION_LIMIT: u64 = 5;

#[derive(Clone, Debug)]
pub enum CatalogEntry {
    Search(PagedResult<MovieSummary>),
    Movie(Movie),
    Trailer(String),
}

/// Catalog reads fronted by the shared expiring cache. Searches, movie
/// details and trailers are cached; suggestions and the genre list always
/// go to the database.
#[derive(Clone)]
pub struct MovieService {
    catalog: CatalogRepository,
    cache: Arc<Cache<CatalogEntry>>,
}

impl MovieService {
    pub fn new(catalog: CatalogRepository, cache: Arc<Cache<CatalogEntry>>) -> Self {
        Self { catalog, cache }
    }

    pub async fn search_movies(
        &self,
        criteria: &SearchCriteria,
    ) -> AppResult<PagedResult<MovieSummary>> {
        criteria.validate()?;
        let criteria = criteria.normalized();
        let key = search_key(&criteria)?;

        if let Some(CatalogEntry::Search(hit)) = self.cache.get(&key) {
            debug!(%key, "search cache hit");
            return Ok(hit);
        }

        let result = self.catalog.search_films(&criteria).await?;
        if !result.items.is_empty() {
            self.cache.set(key, CatalogEntry::Search(result.clone()));
            debug!(entries = self.cache.len(), "cached search result");
        }
        Ok(result)
    }

    pub async fn get_movie(&self, film_id: i32) -> AppResult<Option<Movie>> {
        let key = format!("movie:{film_id}");
        if let Some(CatalogEntry::Movie(hit)) = self.cache.get(&key) {
            return Ok(Some(hit));
        }

        let movie = self.catalog.get_film_by_id(film_id).await?;
        if let Some(movie) = &movie {
            self.cache.set(key, CatalogEntry::Movie(movie.clone()));
        }
        Ok(movie)
    }

    pub async fn get_movie_trailer(&self, film_id: i32) -> AppResult<Option<String>> {
        let key = format!("trailer:{film_id}");
        if let Some(CatalogEntry::Trailer(hit)) = self.cache.get(&key) {
            return Ok(Some(hit));
        }

        let url = self.catalog.get_trailer_by_id(film_id).await?;
        if let Some(url) = &url {
            self.cache.set(key, CatalogEntry::Trailer(url.clone()));
        }
        Ok(url)
    }

    pub async fn get_genres(&self) -> AppResult<Vec<String>> {
        self.catalog.get_genres().await
    }

    pub async fn get_movies_by_writer(&self, name: &str) -> AppResult<Vec<MovieSummary>> {
        self.catalog.get_films_by_writer(name).await
    }

    pub async fn get_suggestions(&self, term: &str) -> AppResult<Vec<NameSuggestion>> {
        self.catalog.get_suggestion(term, SUGGESTION_LIMIT).await
    }

    pub async fn get_actor_suggestions(&self, term: &str) -> AppResult<Vec<NameSuggestion>> {
        self.catalog.get_actor_suggestions(term, SUGGESTION_LIMIT).await
    }

    pub async fn get_writer_suggestions(&self, term: &str) -> AppResult<Vec<NameSuggestion>> {
        self.catalog.get_writer_suggestions(term, SUGGESTION_LIMIT).await
    }
}

// Expects already normalized criteria; field order is fixed by the struct.
fn search_key(criteria: &SearchCriteria) -> AppResult<String> {
    Ok(format!("film_search:{}", serde_json::to_string(criteria)?))
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;
    use crate::{
        cache::tests::ManualClock,
        error::AppError,
        testing::{self, Catalog, TITLES_IN_ORDER},
    };

    async fn service() -> (MovieService, Arc<Cache<CatalogEntry>>, Catalog, sea_orm::DatabaseConnection)
    {
        let db = testing::memory_db().await;
        let seeded = testing::seed_catalog(&db).await;
        let cache = Arc::new(Cache::new(30));
        let service = MovieService::new(CatalogRepository::new(db.clone()), cache.clone());
        (service, cache, seeded, db)
    }

    fn titles(page: &PagedResult<MovieSummary>) -> Vec<&str> {
        page.items.iter().map(|m| m.title.as_str()).collect()
    }

    #[tokio::test]
    async fn empty_criteria_lists_everything_by_title() {
        let (service, _, _, _) = service().await;
        let criteria = SearchCriteria { per_page: 100, ..Default::default() };
        let page = service.search_movies(&criteria).await.unwrap();
        assert_eq!(titles(&page), TITLES_IN_ORDER.to_vec());
        assert_eq!(page.total, 8);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn pages_are_sliced_and_counted() {
        let (service, _, _, _) = service().await;
        let criteria = SearchCriteria { page: 3, per_page: 3, ..Default::default() };
        let page = service.search_movies(&criteria).await.unwrap();
        assert_eq!(titles(&page), vec!["The Matrix", "Warfare"]);
        assert_eq!((page.total, page.total_pages, page.page, page.per_page), (8, 3, 3, 3));

        let criteria = SearchCriteria { page: 9, per_page: 3, ..Default::default() };
        let page = service.search_movies(&criteria).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 8);
    }

    #[tokio::test]
    async fn repeated_search_is_served_from_cache() {
        let (service, cache, _, db) = service().await;
        let criteria = SearchCriteria { title: Some("alien".into()), ..Default::default() };

        let first = service.search_movies(&criteria).await.unwrap();
        assert_eq!(titles(&first), vec!["Alien", "Aliens"]);

        testing::insert_film(&db, "Alien 3", 1992, "English", 114, None).await;

        let second = service.search_movies(&criteria).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn cached_search_expires() {
        let db = testing::memory_db().await;
        testing::seed_catalog(&db).await;
        let clock = ManualClock::new();
        let cache = Arc::new(Cache::with_clock(30, clock.clone()));
        let service = MovieService::new(CatalogRepository::new(db.clone()), cache);
        let criteria = SearchCriteria { title: Some("alien".into()), ..Default::default() };

        assert_eq!(service.search_movies(&criteria).await.unwrap().total, 2);
        testing::insert_film(&db, "Alien 3", 1992, "English", 114, None).await;

        clock.advance(SignedDuration::from_mins(29));
        assert_eq!(service.search_movies(&criteria).await.unwrap().total, 2);

        clock.advance(SignedDuration::from_mins(2));
        assert_eq!(service.search_movies(&criteria).await.unwrap().total, 3);
    }

    #[tokio::test]
    async fn list_order_does_not_change_the_cache_key() {
        let (service, cache, _, _) = service().await;
        let a = SearchCriteria {
            genres_included: vec!["Horror".into(), "Action".into()],
            ..Default::default()
        };
        let b = SearchCriteria {
            genres_included: vec![" Action".into(), "Horror".into(), "Horror".into()],
            ..Default::default()
        };
        assert_eq!(search_key(&a.normalized()).unwrap(), search_key(&b.normalized()).unwrap());

        service.search_movies(&a).await.unwrap();
        service.search_movies(&b).await.unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn empty_results_are_not_cached() {
        let (service, cache, _, _) = service().await;
        let criteria = SearchCriteria { title: Some("zzz".into()), ..Default::default() };
        let page = service.search_movies(&criteria).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn invalid_criteria_are_rejected() {
        let (service, cache, _, _) = service().await;
        let criteria = SearchCriteria { per_page: 0, ..Default::default() };
        let err = service.search_movies(&criteria).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{err:?}");

        let criteria = SearchCriteria { year_min: Some(2000), year_max: Some(1990), ..Default::default() };
        assert!(service.search_movies(&criteria).await.is_err());
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn huge_page_numbers_are_rejected_without_overflow() {
        let (service, _, _, db) = service().await;
        let criteria = SearchCriteria { page: u64::MAX / 2, per_page: 100, ..Default::default() };
        let err = service.search_movies(&criteria).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{err:?}");

        let err = CatalogRepository::new(db).search_films(&criteria).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{err:?}");

        let last = SearchCriteria { page: 1_000_000, per_page: 100, ..Default::default() };
        let page = service.search_movies(&last).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 8);
    }

    #[tokio::test]
    async fn accented_text_matches_itself() {
        let (service, _, seeded, db) = service().await;

        for title in ["Amélie", "amélie", "Amél"] {
            let criteria = SearchCriteria { title: Some(title.into()), ..Default::default() };
            let page = service.search_movies(&criteria).await.unwrap();
            assert_eq!(page.items.iter().map(|m| m.id).collect::<Vec<_>>(), vec![seeded.amelie], "{title}");
        }
        let suggestions = service.get_suggestions("Amé").await.unwrap();
        assert_eq!(suggestions.iter().map(|s| s.id).collect::<Vec<_>>(), vec![seeded.amelie]);

        let diner = testing::insert_film(&db, "Le Dîner", 1998, "Français", 80, None).await;
        testing::tag(&db, diner, &["Comédie"]).await;

        let criteria = SearchCriteria { genres_included: vec!["Comédie".into()], ..Default::default() };
        let page = service.search_movies(&criteria).await.unwrap();
        assert_eq!(page.items.iter().map(|m| m.id).collect::<Vec<_>>(), vec![diner]);

        let criteria = SearchCriteria {
            genres_excluded: vec!["comédie".into()],
            per_page: 100,
            ..Default::default()
        };
        let page = service.search_movies(&criteria).await.unwrap();
        assert_eq!(page.total, 8);
        assert!(!page.items.iter().any(|m| m.id == diner));

        let criteria = SearchCriteria { language: Some("français".into()), ..Default::default() };
        let page = service.search_movies(&criteria).await.unwrap();
        assert_eq!(page.items.iter().map(|m| m.id).collect::<Vec<_>>(), vec![diner]);
    }

    #[tokio::test]
    async fn included_genres_must_all_match() {
        let (service, _, seeded, _) = service().await;
        let criteria = SearchCriteria {
            genres_included: vec!["action".into(), "HORROR".into()],
            ..Default::default()
        };
        let page = service.search_movies(&criteria).await.unwrap();
        assert_eq!(page.items.iter().map(|m| m.id).collect::<Vec<_>>(), vec![seeded.aliens]);
    }

    #[tokio::test]
    async fn excluded_genres_never_appear() {
        let (service, _, _, _) = service().await;
        let criteria = SearchCriteria {
            genres_included: vec!["Action".into()],
            genres_excluded: vec!["Horror".into()],
            ..Default::default()
        };
        let page = service.search_movies(&criteria).await.unwrap();
        assert_eq!(titles(&page), vec!["Die Hard", "The Matrix", "Warfare"]);

        let criteria = SearchCriteria {
            genres_excluded: vec!["Horror".into()],
            per_page: 100,
            ..Default::default()
        };
        let page = service.search_movies(&criteria).await.unwrap();
        assert_eq!(page.total, 6);
        assert!(!titles(&page).iter().any(|t| t.starts_with("Alien")));
    }

    #[tokio::test]
    async fn people_filters_match_substrings() {
        let (service, _, _, _) = service().await;

        let criteria = SearchCriteria { actors: vec!["weaver".into()], ..Default::default() };
        assert_eq!(titles(&service.search_movies(&criteria).await.unwrap()), vec!["Alien", "Aliens"]);

        let criteria = SearchCriteria {
            actors: vec!["reeves".into(), "fishburne".into()],
            writers: vec!["WACHOWSKI".into()],
            ..Default::default()
        };
        assert_eq!(titles(&service.search_movies(&criteria).await.unwrap()), vec!["The Matrix"]);

        let criteria = SearchCriteria {
            actors: vec!["reeves".into(), "weaver".into()],
            ..Default::default()
        };
        assert!(service.search_movies(&criteria).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn scalar_filters_are_combined() {
        let (service, _, _, _) = service().await;

        let criteria =
            SearchCriteria { year_min: Some(1980), year_max: Some(1990), ..Default::default() };
        assert_eq!(titles(&service.search_movies(&criteria).await.unwrap()), vec!["Aliens", "Die Hard"]);

        let criteria = SearchCriteria { language: Some("french".into()), ..Default::default() };
        assert_eq!(titles(&service.search_movies(&criteria).await.unwrap()), vec!["Amélie"]);

        let criteria = SearchCriteria { duration_max: Some(100), ..Default::default() };
        assert_eq!(
            titles(&service.search_movies(&criteria).await.unwrap()),
            vec!["A War Story", "Warfare"]
        );

        let criteria = SearchCriteria { summary: Some("REALITY".into()), ..Default::default() };
        assert_eq!(titles(&service.search_movies(&criteria).await.unwrap()), vec!["The Matrix"]);

        let criteria = SearchCriteria { title: Some("100%".into()), ..Default::default() };
        assert!(service.search_movies(&criteria).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn movie_detail_collects_relations() {
        let (service, cache, seeded, _) = service().await;
        let movie = service.get_movie(seeded.matrix).await.unwrap().unwrap();

        assert_eq!(movie.title, "The Matrix");
        assert_eq!(movie.genres, vec!["Action", "Science Fiction"]);
        assert_eq!(movie.countries, vec!["Australia", "United States"]);
        assert_eq!(movie.writers, vec!["Lana Wachowski", "Lilly Wachowski"]);
        let cast: Vec<_> = movie
            .cast
            .iter()
            .map(|c| (c.name.as_str(), c.character.as_deref()))
            .collect();
        assert_eq!(cast, vec![("Keanu Reeves", Some("Neo")), ("Laurence Fishburne", Some("Morpheus"))]);
        assert_eq!(
            movie.trailers,
            vec!["https://trailers.example/matrix-1", "https://trailers.example/matrix-2"]
        );
        assert_eq!(cache.len(), 1);

        let again = service.get_movie(seeded.matrix).await.unwrap().unwrap();
        assert_eq!(again, movie);
    }

    #[tokio::test]
    async fn missing_movie_is_absent_and_not_cached() {
        let (service, cache, seeded, _) = service().await;
        assert_eq!(service.get_movie(9999).await.unwrap(), None);
        assert_eq!(service.get_movie_trailer(9999).await.unwrap(), None);
        assert_eq!(service.get_movie_trailer(seeded.war_story).await.unwrap(), None);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn trailer_is_the_first_inserted_url() {
        let (service, _, seeded, _) = service().await;
        let url = service.get_movie_trailer(seeded.matrix).await.unwrap();
        assert_eq!(url.as_deref(), Some("https://trailers.example/matrix-1"));
    }

    #[tokio::test]
    async fn title_suggestions_rank_prefix_then_word_then_substring() {
        let (service, _, seeded, _) = service().await;
        let suggestions = service.get_suggestions("War").await.unwrap();
        let ids: Vec<i32> = suggestions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![seeded.warfare, seeded.war_story, seeded.star_wars]);

        assert!(service.get_suggestions("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn suggestions_are_capped() {
        let (service, _, _, _) = service().await;
        let suggestions = service.get_suggestions("a").await.unwrap();
        assert_eq!(suggestions.len(), SUGGESTION_LIMIT as usize);
    }

    #[tokio::test]
    async fn people_suggestions() {
        let (service, _, _, _) = service().await;

        let actors = service.get_actor_suggestions("reev").await.unwrap();
        assert_eq!(actors.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["Keanu Reeves"]);

        let writers = service.get_writer_suggestions("wach").await.unwrap();
        assert_eq!(
            writers.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["Lana Wachowski", "Lilly Wachowski"]
        );
    }

    #[tokio::test]
    async fn genres_and_writer_lookup() {
        let (service, _, seeded, _) = service().await;
        assert_eq!(
            service.get_genres().await.unwrap(),
            vec!["Action", "Comedy", "Drama", "Horror", "Romance", "Science Fiction"]
        );

        let films = service.get_movies_by_writer("  lana wachowski ").await.unwrap();
        assert_eq!(films.iter().map(|m| m.id).collect::<Vec<_>>(), vec![seeded.matrix]);
        assert!(service.get_movies_by_writer("wachowski").await.unwrap().is_empty());
    }
}
