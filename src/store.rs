use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
    sea_query::{Expr, Func, OnConflict},
};

use crate::{
    entities::{movie, planned, user, watched},
    error::AppResult,
    models::{MovieReview, PlannedMovie, WatchOutcome, WatchedMovie},
};

/// Owns the single database connection and exposes one method per use case.
#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns false when the username was already taken.
    pub async fn add_user(&self, username: &str) -> AppResult<bool> {
        let rows = user::Entity::insert(user::ActiveModel {
            username: Set(username.to_string()),
        })
        .on_conflict(OnConflict::column(user::Column::Username).do_nothing().to_owned())
        .exec_without_returning(&self.db)
        .await?;

        Ok(rows > 0)
    }

    pub async fn add_movie(&self, title: &str, release_timestamp: i64) -> AppResult<i32> {
        let res = movie::Entity::insert(movie::ActiveModel {
            id: Default::default(),
            title: Set(title.to_string()),
            release_timestamp: Set(release_timestamp),
        })
        .exec(&self.db)
        .await?;

        Ok(res.last_insert_id)
    }

    pub async fn all_movies(&self) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find().order_by_asc(movie::Column::Id).all(&self.db).await?)
    }

    /// Movies with a release timestamp strictly after `now_ts`.
    pub async fn upcoming_movies(&self, now_ts: i64) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find()
            .filter(movie::Column::ReleaseTimestamp.gt(now_ts))
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Case-insensitive substring match anywhere in the title.
    pub async fn search_movies(&self, term: &str) -> AppResult<Vec<movie::Model>> {
        let pattern = format!("%{}%", term.to_lowercase());
        Ok(movie::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col(movie::Column::Title))).like(pattern))
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn all_users(&self) -> AppResult<Vec<String>> {
        let users = user::Entity::find().order_by_asc(user::Column::Username).all(&self.db).await?;
        Ok(users.into_iter().map(|u| u.username).collect())
    }

    /// Records a watched entry, creating the user row if absent. A second
    /// watch of the same (user, movie) pair leaves the first entry untouched.
    pub async fn watch_movie(
        &self,
        username: &str,
        movie_id: i32,
        review: Option<String>,
        rating: Option<i32>,
    ) -> AppResult<WatchOutcome> {
        let txn = self.db.begin().await?;

        user::Entity::insert(user::ActiveModel {
            username: Set(username.to_string()),
        })
        .on_conflict(OnConflict::column(user::Column::Username).do_nothing().to_owned())
        .exec_without_returning(&txn)
        .await?;

        let existing = watched::Entity::find()
            .filter(watched::Column::UserUsername.eq(username))
            .filter(watched::Column::MovieId.eq(movie_id))
            .one(&txn)
            .await?;

        if existing.is_some() {
            txn.commit().await?;
            return Ok(WatchOutcome::AlreadyWatched);
        }

        watched::Entity::insert(watched::ActiveModel {
            id: Default::default(),
            user_username: Set(username.to_string()),
            movie_id: Set(movie_id),
            review: Set(review),
            rating: Set(rating),
        })
        .exec(&txn)
        .await?;

        txn.commit().await?;
        Ok(WatchOutcome::Recorded)
    }

    pub async fn watched_movies(&self, username: &str) -> AppResult<Vec<WatchedMovie>> {
        let rows = watched::Entity::find()
            .filter(watched::Column::UserUsername.eq(username))
            .find_also_related(movie::Entity)
            .order_by_asc(watched::Column::MovieId)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(entry, movie)| {
                movie.map(|movie| WatchedMovie {
                    movie,
                    review: entry.review,
                    rating: entry.rating,
                })
            })
            .collect())
    }

    /// Returns false when the (user, movie) pair was already planned.
    pub async fn plan_movie(
        &self,
        username: &str,
        movie_id: i32,
        expectation: Option<String>,
    ) -> AppResult<bool> {
        let rows = planned::Entity::insert(planned::ActiveModel {
            id: Default::default(),
            user_username: Set(username.to_string()),
            movie_id: Set(movie_id),
            expectation: Set(expectation),
        })
        .on_conflict(
            OnConflict::columns([planned::Column::UserUsername, planned::Column::MovieId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await?;

        Ok(rows > 0)
    }

    pub async fn planned_movies(&self, username: &str) -> AppResult<Vec<PlannedMovie>> {
        let rows = planned::Entity::find()
            .filter(planned::Column::UserUsername.eq(username))
            .find_also_related(movie::Entity)
            .order_by_asc(planned::Column::MovieId)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(entry, movie)| {
                movie.map(|movie| PlannedMovie {
                    movie,
                    expectation: entry.expectation,
                })
            })
            .collect())
    }

    /// Removes a planned entry; returns the number of rows deleted.
    pub async fn unplan_movie(&self, username: &str, movie_id: i32) -> AppResult<u64> {
        let res = planned::Entity::delete_many()
            .filter(planned::Column::UserUsername.eq(username))
            .filter(planned::Column::MovieId.eq(movie_id))
            .exec(&self.db)
            .await?;

        Ok(res.rows_affected)
    }

    /// Watched entries for a movie that carry a review or a rating.
    pub async fn reviews_for_movie(&self, movie_id: i32) -> AppResult<Vec<MovieReview>> {
        let rows = watched::Entity::find()
            .filter(watched::Column::MovieId.eq(movie_id))
            .filter(
                Condition::any()
                    .add(watched::Column::Review.is_not_null())
                    .add(watched::Column::Rating.is_not_null()),
            )
            .order_by_asc(watched::Column::UserUsername)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|entry| MovieReview {
                username: entry.user_username,
                review: entry.review,
                rating: entry.rating,
            })
            .collect())
    }
}

pub fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

#[cfg(test)]
mod tests {
    use migration::{Migrator, MigratorTrait};

    use super::*;

    async fn memory_store() -> Store {
        // A pooled in-memory sqlite gives each connection its own database;
        // pin the pool to one connection so the migrated schema is shared.
        let mut opts = sea_orm::ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1);
        let db = sea_orm::Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        Store::new(db)
    }

    #[tokio::test]
    async fn add_user_ignores_duplicates() {
        let store = memory_store().await;

        assert!(store.add_user("alice").await.unwrap());
        assert!(!store.add_user("alice").await.unwrap());
        assert_eq!(store.all_users().await.unwrap(), vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn watch_records_once_then_rejects_duplicate() {
        let store = memory_store().await;
        store.add_user("alice").await.unwrap();
        let id = store.add_movie("Arrival", 1_400_000_000).await.unwrap();

        let first = store
            .watch_movie("alice", id, Some("great".to_string()), Some(90))
            .await
            .unwrap();
        assert_eq!(first, WatchOutcome::Recorded);

        let second = store
            .watch_movie("alice", id, Some("changed my mind".to_string()), Some(10))
            .await
            .unwrap();
        assert_eq!(second, WatchOutcome::AlreadyWatched);

        let watched = store.watched_movies("alice").await.unwrap();
        assert_eq!(watched.len(), 1);
        assert_eq!(watched[0].movie.title, "Arrival");
        assert_eq!(watched[0].review.as_deref(), Some("great"));
        assert_eq!(watched[0].rating, Some(90));
    }

    #[tokio::test]
    async fn watch_creates_missing_user() {
        let store = memory_store().await;
        let id = store.add_movie("Heat", 800_000_000).await.unwrap();

        store.watch_movie("bob", id, None, None).await.unwrap();

        assert_eq!(store.all_users().await.unwrap(), vec!["bob".to_string()]);
        assert_eq!(store.watched_movies("bob").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn watch_rejects_unknown_movie_id() {
        let store = memory_store().await;
        store.add_user("alice").await.unwrap();

        // No such movie row; the foreign key must refuse the insert.
        assert!(store.watch_movie("alice", 999, None, None).await.is_err());
        assert!(store.watched_movies("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upcoming_filters_strictly_after_now() {
        let store = memory_store().await;
        store.add_movie("Past", 100).await.unwrap();
        store.add_movie("Present", 200).await.unwrap();
        store.add_movie("Future", 300).await.unwrap();

        let upcoming = store.upcoming_movies(200).await.unwrap();
        let titles: Vec<_> = upcoming.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Future"]);

        assert_eq!(store.all_movies().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let store = memory_store().await;
        store.add_movie("The Matrix", 900_000_000).await.unwrap();
        store.add_movie("Blade Runner", 600_000_000).await.unwrap();

        let hits = store.search_movies("matrix").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "The Matrix");

        assert_eq!(store.search_movies("MAT").await.unwrap().len(), 1);
        assert_eq!(store.search_movies("runner").await.unwrap().len(), 1);
        assert!(store.search_movies("alien").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn plan_and_watch_are_independent() {
        let store = memory_store().await;
        store.add_user("alice").await.unwrap();
        let id = store.add_movie("Dune", 1_600_000_000).await.unwrap();

        assert!(store.plan_movie("alice", id, Some("epic scale".to_string())).await.unwrap());
        let outcome = store.watch_movie("alice", id, Some("it was".to_string()), None).await.unwrap();
        assert_eq!(outcome, WatchOutcome::Recorded);

        let planned = store.planned_movies("alice").await.unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].expectation.as_deref(), Some("epic scale"));

        let watched = store.watched_movies("alice").await.unwrap();
        assert_eq!(watched.len(), 1);
        assert_eq!(watched[0].review.as_deref(), Some("it was"));
    }

    #[tokio::test]
    async fn duplicate_plan_is_ignored() {
        let store = memory_store().await;
        store.add_user("alice").await.unwrap();
        let id = store.add_movie("Tenet", 1_500_000_000).await.unwrap();

        assert!(store.plan_movie("alice", id, None).await.unwrap());
        assert!(!store.plan_movie("alice", id, Some("again".to_string())).await.unwrap());
        assert_eq!(store.planned_movies("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unplan_removes_the_entry() {
        let store = memory_store().await;
        store.add_user("alice").await.unwrap();
        let id = store.add_movie("Solaris", 50_000_000).await.unwrap();
        store.plan_movie("alice", id, None).await.unwrap();

        assert_eq!(store.unplan_movie("alice", id).await.unwrap(), 1);
        assert!(store.planned_movies("alice").await.unwrap().is_empty());
        assert_eq!(store.unplan_movie("alice", id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reviews_exclude_entries_without_review_or_rating() {
        let store = memory_store().await;
        let id = store.add_movie("Alien", 300_000_000).await.unwrap();

        store.watch_movie("alice", id, Some("terrifying".to_string()), Some(95)).await.unwrap();
        store.watch_movie("bob", id, None, Some(80)).await.unwrap();
        store.watch_movie("carol", id, None, None).await.unwrap();

        let reviews = store.reviews_for_movie(id).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].username, "alice");
        assert_eq!(reviews[0].review.as_deref(), Some("terrifying"));
        assert_eq!(reviews[1].username, "bob");
        assert_eq!(reviews[1].rating, Some(80));
    }
}
