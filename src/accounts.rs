use jiff::Timestamp;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
    sea_query::{Expr, Query},
};
use tracing::{debug, info};
use validator::Validate;

use crate::{
    auth,
    entities::{client, film, rental},
    error::{AppError, AppResult},
    models::{Credentials, MovieSummary, Profile, ProfileUpdate, Registration},
};

#[derive(Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert(&self, client: client::ActiveModel) -> Result<client::Model, DbErr> {
        client.insert(&self.db).await
    }

    pub async fn update(&self, client: client::ActiveModel) -> Result<client::Model, DbErr> {
        client.update(&self.db).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<client::Model>, DbErr> {
        find_by_email(&self.db, email).await
    }

    pub async fn balance(&self, email: &str) -> Result<Option<i32>, DbErr> {
        balance(&self.db, email).await
    }

    pub async fn add_credits(&self, email: &str, amount: i32) -> Result<bool, DbErr> {
        let result = client::Entity::update_many()
            .col_expr(client::Column::Credits, Expr::col(client::Column::Credits).add(amount))
            .filter(client::Column::Email.eq(email))
            .filter(client::Column::Credits.lte(i32::MAX.saturating_sub(amount)))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn redeem_credits(&self, email: &str, amount: i32) -> Result<bool, DbErr> {
        redeem(&self.db, email, amount).await
    }

    /// Charges `cost` and records the rental in one transaction. Returns the
    /// remaining balance.
    pub async fn rent(&self, email: &str, film_id: i32, cost: i32) -> AppResult<i32> {
        let txn = self.db.begin().await?;

        let client = find_by_email(&txn, email).await?.ok_or(AppError::NotFound("client"))?;
        if film::Entity::find_by_id(film_id).one(&txn).await?.is_none() {
            return Err(AppError::NotFound("movie"));
        }
        if !redeem(&txn, email, cost).await? {
            return Err(AppError::InsufficientCredits);
        }

        rental::ActiveModel {
            client_id: Set(client.id),
            film_id: Set(film_id),
            rented_at: Set(Timestamp::now().as_second()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let remaining = balance(&txn, email).await?.ok_or(AppError::NotFound("client"))?;
        txn.commit().await?;
        Ok(remaining)
    }

    pub async fn rented_movies(&self, email: &str) -> Result<Vec<film::Model>, DbErr> {
        let rented = Query::select()
            .column((rental::Entity, rental::Column::FilmId))
            .from(rental::Entity)
            .inner_join(
                client::Entity,
                Expr::col((client::Entity, client::Column::Id))
                    .equals((rental::Entity, rental::Column::ClientId)),
            )
            .and_where(Expr::col((client::Entity, client::Column::Email)).eq(email))
            .to_owned();

        film::Entity::find()
            .filter(film::Column::Id.in_subquery(rented))
            .order_by_asc(film::Column::Title)
            .order_by_asc(film::Column::Id)
            .all(&self.db)
            .await
    }
}

async fn find_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> Result<Option<client::Model>, DbErr> {
    client::Entity::find().filter(client::Column::Email.eq(email)).one(conn).await
}

async fn balance<C: ConnectionTrait>(conn: &C, email: &str) -> Result<Option<i32>, DbErr> {
    client::Entity::find()
        .select_only()
        .column(client::Column::Credits)
        .filter(client::Column::Email.eq(email))
        .into_tuple()
        .one(conn)
        .await
}

// Decrements only while the stored balance covers `amount`.
async fn redeem<C: ConnectionTrait>(conn: &C, email: &str, amount: i32) -> Result<bool, DbErr> {
    let result = client::Entity::update_many()
        .col_expr(client::Column::Credits, Expr::col(client::Column::Credits).sub(amount))
        .filter(client::Column::Email.eq(email))
        .filter(client::Column::Credits.gte(amount))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn hash(password: String) -> AppResult<String> {
    let hashed = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(hashed)
}

async fn verify(password: String, hash: String) -> AppResult<bool> {
    let ok = tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(ok)
}

#[derive(Clone)]
pub struct AccountService {
    accounts: AccountRepository,
    rental_cost: i32,
    signup_credits: i32,
}

impl AccountService {
    pub fn new(accounts: AccountRepository, rental_cost: i32, signup_credits: i32) -> Self {
        Self { accounts, rental_cost, signup_credits }
    }

    pub async fn register(&self, registration: &Registration) -> AppResult<Profile> {
        registration.validate()?;
        let email = normalize_email(&registration.email);

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("email already registered".into()));
        }

        let client = client::ActiveModel {
            email: Set(email.clone()),
            password_hash: Set(hash(registration.password.clone()).await?),
            last_name: Set(registration.last_name.trim().to_string()),
            first_name: Set(registration.first_name.trim().to_string()),
            phone: Set(registration.phone.clone()),
            birth_date: Set(registration.birth_date.map(|d| d.to_string())),
            address: Set(registration.address.clone()),
            city: Set(registration.city.clone()),
            province: Set(registration.province.clone()),
            postal_code: Set(registration.postal_code.clone()),
            plan: Set(registration.plan.clone()),
            credits: Set(self.signup_credits),
            ..Default::default()
        };

        let created = match self.accounts.insert(client).await {
            Ok(created) => created,
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(AppError::Conflict("email already registered".into()));
            }
            Err(err) => return Err(err.into()),
        };

        info!(client_id = created.id, "registered client");
        Ok(Profile::from(created))
    }

    /// Returns the normalized email on success.
    pub async fn authenticate(&self, credentials: &Credentials) -> AppResult<String> {
        let email = normalize_email(&credentials.email);
        let Some(client) = self.accounts.find_by_email(&email).await? else {
            debug!("login for unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !verify(credentials.password.clone(), client.password_hash).await? {
            debug!(client_id = client.id, "login with wrong password");
            return Err(AppError::InvalidCredentials);
        }
        Ok(email)
    }

    pub async fn get_profile(&self, email: &str) -> AppResult<Option<Profile>> {
        let client = self.accounts.find_by_email(&normalize_email(email)).await?;
        Ok(client.map(Profile::from))
    }

    /// Applies only the supplied fields. Returns false when no client has
    /// this email.
    pub async fn update_profile(&self, email: &str, update: &ProfileUpdate) -> AppResult<bool> {
        update.validate()?;
        let Some(client) = self.accounts.find_by_email(&normalize_email(email)).await? else {
            return Ok(false);
        };

        let mut active: client::ActiveModel = client.into();
        if let Some(last_name) = &update.last_name {
            active.last_name = Set(last_name.trim().to_string());
        }
        if let Some(first_name) = &update.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(password) = &update.password {
            active.password_hash = Set(hash(password.clone()).await?);
        }
        if let Some(phone) = &update.phone {
            active.phone = Set(Some(phone.clone()));
        }
        if let Some(birth_date) = update.birth_date {
            active.birth_date = Set(Some(birth_date.to_string()));
        }
        if let Some(address) = &update.address {
            active.address = Set(Some(address.clone()));
        }
        if let Some(city) = &update.city {
            active.city = Set(Some(city.clone()));
        }
        if let Some(province) = &update.province {
            active.province = Set(Some(province.clone()));
        }
        if let Some(postal_code) = &update.postal_code {
            active.postal_code = Set(Some(postal_code.clone()));
        }
        if let Some(plan) = &update.plan {
            active.plan = Set(Some(plan.clone()));
        }

        if active.is_changed() {
            self.accounts.update(active).await?;
        }
        Ok(true)
    }

    pub async fn get_balance(&self, email: &str) -> AppResult<Option<i32>> {
        Ok(self.accounts.balance(&normalize_email(email)).await?)
    }

    /// Returns the new balance, or `None` when no client has this email.
    pub async fn add_credits(&self, email: &str, amount: i32) -> AppResult<Option<i32>> {
        if amount <= 0 {
            return Err(AppError::Validation("amount must be positive".into()));
        }
        let email = normalize_email(email);
        if !self.accounts.add_credits(&email, amount).await? {
            return match self.accounts.balance(&email).await? {
                Some(_) => Err(AppError::Validation("credit balance limit reached".into())),
                None => Ok(None),
            };
        }
        Ok(self.accounts.balance(&email).await?)
    }

    /// False when the balance is below `amount`; the balance is left untouched.
    pub async fn redeem_credits(&self, email: &str, amount: i32) -> AppResult<bool> {
        if amount <= 0 {
            return Err(AppError::Validation("amount must be positive".into()));
        }
        Ok(self.accounts.redeem_credits(&normalize_email(email), amount).await?)
    }

    pub async fn rent(&self, email: &str, film_id: i32) -> AppResult<i32> {
        let remaining =
            self.accounts.rent(&normalize_email(email), film_id, self.rental_cost).await?;
        info!(film_id, remaining, "rented film");
        Ok(remaining)
    }

    pub async fn get_rented_movies(&self, email: &str) -> AppResult<Vec<MovieSummary>> {
        let films = self.accounts.rented_movies(&normalize_email(email)).await?;
        Ok(films.into_iter().map(MovieSummary::from).collect())
    }
}
