//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations with
//! proper error handling and transaction support. Uniqueness rules are
//! enforced by store constraints and translated into domain errors
//! here, so concurrent writers cannot slip past application pre-checks.

use crate::auth::generate_confirmation_code;
use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{ApiError, Result};
use crate::rating::mean_score;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, JoinType,
    LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
    TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Filters accepted by the title listing
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    /// Exact category slug
    pub category: Option<String>,

    /// Exact genre slug
    pub genre: Option<String>,

    /// Substring of the title name
    pub name: Option<String>,

    /// Exact release year
    pub year: Option<i16>,
}

/// A title with its read-time projections: nested category, genres,
/// and the computed rating
#[derive(Debug, Clone)]
pub struct TitleWithMeta {
    pub title: Title,
    pub category: Option<Category>,
    pub genres: Vec<Genre>,
    pub rating: Option<f64>,
}

/// One page of titles plus the unpaginated total
#[derive(Debug, Clone)]
pub struct TitlePage {
    pub items: Vec<TitleWithMeta>,
    pub total: u64,
}

/// Field changes for a user update; None leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

/// Field changes for a title update; None leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i16>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genres: Option<Vec<String>>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    /// Find user by ID
    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        UserEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find user by username
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Username.eq(username))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find user by email
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Email.eq(email))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find user by username, failing with NotFound
    pub async fn get_user_by_username(&self, username: &str) -> Result<User> {
        self.find_user_by_username(username)
            .await?
            .ok_or_else(|| ApiError::UserNotFound {
                username: username.to_string(),
            })
    }

    /// List users ordered by username, optionally filtered by exact
    /// username match
    pub async fn list_users(
        &self,
        search: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<User>, u64)> {
        let mut query = UserEntity::find();

        if let Some(username) = search {
            query = query.filter(UserColumn::Username.eq(username));
        }

        let paginator = query
            .order_by_asc(UserColumn::Username)
            .paginate(self.read_conn(), page_size);

        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page).await?;

        Ok((users, total))
    }

    /// Create a user (admin surface; the signup path goes through
    /// issue_confirmation_code instead)
    pub async fn create_user(
        &self,
        username: String,
        email: String,
        first_name: String,
        last_name: String,
        bio: String,
        role: Role,
    ) -> Result<User> {
        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username),
            email: Set(email),
            first_name: Set(first_name),
            last_name: Set(last_name),
            bio: Set(bio),
            role: Set(role.into()),
            is_staff: Set(false),
            confirmation_code: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        };

        user.insert(self.write_conn())
            .await
            .map_err(translate_user_unique)
    }

    /// Apply field changes to a user row
    pub async fn update_user(&self, user: User, changes: UserChanges) -> Result<User> {
        let mut active = user.into_active_model();

        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(bio);
        }
        if let Some(role) = changes.role {
            active.role = Set(role.into());
        }

        active
            .update(self.write_conn())
            .await
            .map_err(translate_user_unique)
    }

    /// Delete a user by username
    pub async fn delete_user(&self, username: &str) -> Result<()> {
        let result = UserEntity::delete_many()
            .filter(UserColumn::Username.eq(username))
            .exec(self.write_conn())
            .await?;

        if result.rows_affected == 0 {
            return Err(ApiError::UserNotFound {
                username: username.to_string(),
            });
        }

        Ok(())
    }

    // ========================================================================
    // Signup / Confirmation Code Operations
    // ========================================================================

    /// Create the user row if absent (rejecting an email that belongs
    /// to someone else), then rotate the confirmation code. Concurrent
    /// retries for the same user may race; the last writer's code wins.
    pub async fn issue_confirmation_code(
        &self,
        username: &str,
        email: &str,
    ) -> Result<(User, String)> {
        let code = generate_confirmation_code();

        if let Some(user) = self.find_user_by_username(username).await? {
            // Re-signup: the supplied email must match the one on record
            if user.email != email {
                return Err(ApiError::EmailMismatch);
            }

            let mut active = user.into_active_model();
            active.confirmation_code = Set(Some(code.clone()));
            let user = active.update(self.write_conn()).await?;
            return Ok((user, code));
        }

        if self.find_user_by_email(email).await?.is_some() {
            return Err(ApiError::AlreadyExists {
                message: format!("email {} is already in use", email),
            });
        }

        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            bio: Set(String::new()),
            role: Set(Role::User.into()),
            is_staff: Set(false),
            confirmation_code: Set(Some(code.clone())),
            created_at: Set(chrono::Utc::now().into()),
        };

        let user = user
            .insert(self.write_conn())
            .await
            .map_err(translate_user_unique)?;

        Ok((user, code))
    }

    /// Exact-match the supplied code against the user's current one.
    /// The code stays valid for repeated verification until rotated.
    pub async fn verify_confirmation_code(&self, username: &str, code: &str) -> Result<User> {
        let user = self.get_user_by_username(username).await?;

        if user.confirmation_code.as_deref() != Some(code) {
            return Err(ApiError::InvalidConfirmationCode);
        }

        Ok(user)
    }

    // ========================================================================
    // Category Operations
    // ========================================================================

    /// List categories ordered by name, optionally filtered by a name
    /// substring
    pub async fn list_categories(
        &self,
        search: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<Category>, u64)> {
        let mut query = CategoryEntity::find();

        if let Some(name) = search {
            query = query.filter(CategoryColumn::Name.contains(name));
        }

        let paginator = query
            .order_by_asc(CategoryColumn::Name)
            .paginate(self.read_conn(), page_size);

        let total = paginator.num_items().await?;
        let categories = paginator.fetch_page(page).await?;

        Ok((categories, total))
    }

    /// Find category by slug
    pub async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        CategoryEntity::find()
            .filter(CategoryColumn::Slug.eq(slug))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Create a category
    pub async fn create_category(&self, name: String, slug: String) -> Result<Category> {
        let category = CategoryActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            slug: Set(slug.clone()),
        };

        category
            .insert(self.write_conn())
            .await
            .map_err(|e| translate_slug_unique(e, &slug))
    }

    /// Delete a category by slug
    pub async fn delete_category(&self, slug: &str) -> Result<()> {
        let result = CategoryEntity::delete_many()
            .filter(CategoryColumn::Slug.eq(slug))
            .exec(self.write_conn())
            .await?;

        if result.rows_affected == 0 {
            return Err(ApiError::CategoryNotFound {
                slug: slug.to_string(),
            });
        }

        Ok(())
    }

    // ========================================================================
    // Genre Operations
    // ========================================================================

    /// List genres ordered by name, optionally filtered by a name
    /// substring
    pub async fn list_genres(
        &self,
        search: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<Genre>, u64)> {
        let mut query = GenreEntity::find();

        if let Some(name) = search {
            query = query.filter(GenreColumn::Name.contains(name));
        }

        let paginator = query
            .order_by_asc(GenreColumn::Name)
            .paginate(self.read_conn(), page_size);

        let total = paginator.num_items().await?;
        let genres = paginator.fetch_page(page).await?;

        Ok((genres, total))
    }

    /// Create a genre
    pub async fn create_genre(&self, name: String, slug: String) -> Result<Genre> {
        let genre = GenreActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            slug: Set(slug.clone()),
        };

        genre
            .insert(self.write_conn())
            .await
            .map_err(|e| translate_slug_unique(e, &slug))
    }

    /// Delete a genre by slug
    pub async fn delete_genre(&self, slug: &str) -> Result<()> {
        let result = GenreEntity::delete_many()
            .filter(GenreColumn::Slug.eq(slug))
            .exec(self.write_conn())
            .await?;

        if result.rows_affected == 0 {
            return Err(ApiError::GenreNotFound {
                slug: slug.to_string(),
            });
        }

        Ok(())
    }

    /// Resolve genre slugs for a title write; an unknown slug is a
    /// validation failure, not a missing resource
    async fn resolve_genres(&self, slugs: &[String]) -> Result<Vec<Genre>> {
        let mut genres = Vec::with_capacity(slugs.len());

        for slug in slugs {
            let genre = GenreEntity::find()
                .filter(GenreColumn::Slug.eq(slug))
                .one(self.read_conn())
                .await?
                .ok_or_else(|| ApiError::Validation {
                    message: format!("unknown genre slug: {}", slug),
                    field: Some("genre".to_string()),
                })?;
            genres.push(genre);
        }

        Ok(genres)
    }

    /// Resolve a category slug for a title write
    async fn resolve_category(&self, slug: &str) -> Result<Category> {
        self.find_category_by_slug(slug)
            .await?
            .ok_or_else(|| ApiError::Validation {
                message: format!("unknown category slug: {}", slug),
                field: Some("category".to_string()),
            })
    }

    // ========================================================================
    // Title Operations
    // ========================================================================

    /// List titles with filters, pagination, and read-time projections
    pub async fn list_titles(
        &self,
        filter: &TitleFilter,
        page: u64,
        page_size: u64,
    ) -> Result<TitlePage> {
        let mut query = TitleEntity::find();

        if let Some(year) = filter.year {
            query = query.filter(TitleColumn::Year.eq(year));
        }
        if let Some(ref name) = filter.name {
            query = query.filter(TitleColumn::Name.contains(name));
        }
        if let Some(ref category) = filter.category {
            query = query
                .join(JoinType::InnerJoin, TitleRelation::Category.def())
                .filter(CategoryColumn::Slug.eq(category));
        }
        if let Some(ref genre) = filter.genre {
            query = query
                .join(JoinType::InnerJoin, TitleRelation::TitleGenres.def())
                .join(JoinType::InnerJoin, TitleGenreRelation::Genre.def())
                .filter(GenreColumn::Slug.eq(genre));
        }

        let paginator = query
            .order_by_asc(TitleColumn::Name)
            .paginate(self.read_conn(), page_size);

        let total = paginator.num_items().await?;
        let titles = paginator.fetch_page(page).await?;
        let items = self.hydrate_titles(titles).await?;

        Ok(TitlePage { items, total })
    }

    /// Find a title with its projections, failing with NotFound
    pub async fn get_title(&self, id: Uuid) -> Result<TitleWithMeta> {
        let title = TitleEntity::find_by_id(id)
            .one(self.read_conn())
            .await?
            .ok_or_else(|| ApiError::TitleNotFound { id: id.to_string() })?;

        let mut items = self.hydrate_titles(vec![title]).await?;
        items.pop().ok_or_else(|| ApiError::Internal {
            message: "title hydration returned no rows".to_string(),
        })
    }

    /// Check that a title exists without loading projections
    pub async fn title_exists(&self, id: Uuid) -> Result<()> {
        TitleEntity::find_by_id(id)
            .one(self.read_conn())
            .await?
            .map(|_| ())
            .ok_or_else(|| ApiError::TitleNotFound { id: id.to_string() })
    }

    /// Create a title with its genre set, atomically
    pub async fn create_title(
        &self,
        name: String,
        year: i16,
        description: Option<String>,
        category_slug: &str,
        genre_slugs: &[String],
    ) -> Result<TitleWithMeta> {
        let category = self.resolve_category(category_slug).await?;
        let genres = self.resolve_genres(genre_slugs).await?;

        let txn = self.write_conn().begin().await?;

        let title = TitleActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            year: Set(year),
            description: Set(description),
            category_id: Set(Some(category.id)),
        };
        let title = title.insert(&txn).await?;

        for genre in &genres {
            TitleGenreActiveModel {
                title_id: Set(title.id),
                genre_id: Set(genre.id),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        Ok(TitleWithMeta {
            title,
            category: Some(category),
            genres,
            rating: None,
        })
    }

    /// Apply field changes to a title; genre changes replace the whole
    /// association set inside the same transaction
    pub async fn update_title(&self, id: Uuid, changes: TitleChanges) -> Result<TitleWithMeta> {
        let title = TitleEntity::find_by_id(id)
            .one(self.read_conn())
            .await?
            .ok_or_else(|| ApiError::TitleNotFound { id: id.to_string() })?;

        let category = match changes.category {
            Some(ref slug) => Some(self.resolve_category(slug).await?),
            None => None,
        };
        let genres = match changes.genres {
            Some(ref slugs) => Some(self.resolve_genres(slugs).await?),
            None => None,
        };

        let txn = self.write_conn().begin().await?;

        let mut active = title.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(year) = changes.year {
            active.year = Set(year);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(ref category) = category {
            active.category_id = Set(Some(category.id));
        }
        let title = active.update(&txn).await?;

        if let Some(ref genres) = genres {
            TitleGenreEntity::delete_many()
                .filter(TitleGenreColumn::TitleId.eq(title.id))
                .exec(&txn)
                .await?;

            for genre in genres {
                TitleGenreActiveModel {
                    title_id: Set(title.id),
                    genre_id: Set(genre.id),
                }
                .insert(&txn)
                .await?;
            }
        }

        txn.commit().await?;

        self.get_title(title.id).await
    }

    /// Delete a title; reviews and comments cascade at the store level
    pub async fn delete_title(&self, id: Uuid) -> Result<()> {
        let result = TitleEntity::delete_by_id(id).exec(self.write_conn()).await?;

        if result.rows_affected == 0 {
            return Err(ApiError::TitleNotFound { id: id.to_string() });
        }

        Ok(())
    }

    /// Attach categories, genres, and ratings to a set of titles
    async fn hydrate_titles(&self, titles: Vec<Title>) -> Result<Vec<TitleWithMeta>> {
        let categories = titles.load_one(CategoryEntity, self.read_conn()).await?;
        let genres = titles
            .load_many_to_many(GenreEntity, TitleGenreEntity, self.read_conn())
            .await?;

        let ids: Vec<Uuid> = titles.iter().map(|t| t.id).collect();
        let mut ratings = self.ratings_for(&ids).await?;

        Ok(titles
            .into_iter()
            .zip(categories)
            .zip(genres)
            .map(|((title, category), genres)| {
                let rating = ratings.remove(&title.id);
                TitleWithMeta {
                    title,
                    category,
                    genres,
                    rating,
                }
            })
            .collect())
    }

    /// Compute mean review scores for a set of titles from one scores
    /// query; titles with no reviews are absent from the map (no
    /// rating, not a rating of 0)
    async fn ratings_for(&self, title_ids: &[Uuid]) -> Result<HashMap<Uuid, f64>> {
        if title_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i16)> = ReviewEntity::find()
            .select_only()
            .column(ReviewColumn::TitleId)
            .column(ReviewColumn::Score)
            .filter(ReviewColumn::TitleId.is_in(title_ids.iter().copied()))
            .into_tuple()
            .all(self.read_conn())
            .await?;

        let mut scores: HashMap<Uuid, Vec<i16>> = HashMap::new();
        for (title_id, score) in rows {
            scores.entry(title_id).or_default().push(score);
        }

        Ok(scores
            .into_iter()
            .filter_map(|(id, scores)| mean_score(&scores).map(|rating| (id, rating)))
            .collect())
    }

    // ========================================================================
    // Review Operations
    // ========================================================================

    /// List reviews for a title, newest first, with their authors
    pub async fn list_reviews(
        &self,
        title_id: Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<(Review, User)>, u64)> {
        let paginator = ReviewEntity::find()
            .filter(ReviewColumn::TitleId.eq(title_id))
            .order_by_desc(ReviewColumn::CreatedAt)
            .paginate(self.read_conn(), page_size);

        let total = paginator.num_items().await?;
        let reviews = paginator.fetch_page(page).await?;

        let authors = reviews.load_one(UserEntity, self.read_conn()).await?;
        let rows = zip_authors(reviews, authors)?;

        Ok((rows, total))
    }

    /// Create a review. The one-review-per-title-per-author rule is
    /// enforced by the store's unique constraint so that two concurrent
    /// creations cannot both commit; the violation surfaces as a
    /// conflict.
    pub async fn create_review(
        &self,
        title_id: Uuid,
        author_id: Uuid,
        text: String,
        score: i16,
    ) -> Result<Review> {
        let review = ReviewActiveModel {
            id: Set(Uuid::new_v4()),
            title_id: Set(title_id),
            author_id: Set(author_id),
            text: Set(text),
            score: Set(score),
            created_at: Set(chrono::Utc::now().into()),
        };

        review
            .insert(self.write_conn())
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::ReviewExists,
                _ => ApiError::Database(e),
            })
    }

    /// Find a review under a title, failing with NotFound
    pub async fn get_review(&self, title_id: Uuid, review_id: Uuid) -> Result<Review> {
        ReviewEntity::find_by_id(review_id)
            .filter(ReviewColumn::TitleId.eq(title_id))
            .one(self.read_conn())
            .await?
            .ok_or_else(|| ApiError::ReviewNotFound {
                id: review_id.to_string(),
            })
    }

    /// Find a review and its author
    pub async fn get_review_with_author(
        &self,
        title_id: Uuid,
        review_id: Uuid,
    ) -> Result<(Review, User)> {
        let review = self.get_review(title_id, review_id).await?;
        let author = self
            .find_user_by_id(review.author_id)
            .await?
            .ok_or_else(|| ApiError::Internal {
                message: "review author row missing".to_string(),
            })?;

        Ok((review, author))
    }

    /// Update a review's text and/or score. Uniqueness is checked only
    /// on creation; updates cannot move a review to another title.
    pub async fn update_review(
        &self,
        review: Review,
        text: Option<String>,
        score: Option<i16>,
    ) -> Result<Review> {
        let mut active = review.into_active_model();

        if let Some(text) = text {
            active.text = Set(text);
        }
        if let Some(score) = score {
            active.score = Set(score);
        }

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete a review; its comments cascade at the store level
    pub async fn delete_review(&self, review_id: Uuid) -> Result<()> {
        let result = ReviewEntity::delete_by_id(review_id)
            .exec(self.write_conn())
            .await?;

        if result.rows_affected == 0 {
            return Err(ApiError::ReviewNotFound {
                id: review_id.to_string(),
            });
        }

        Ok(())
    }

    // ========================================================================
    // Comment Operations
    // ========================================================================

    /// List comments for a review, newest first, with their authors
    pub async fn list_comments(
        &self,
        review_id: Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<(Comment, User)>, u64)> {
        let paginator = CommentEntity::find()
            .filter(CommentColumn::ReviewId.eq(review_id))
            .order_by_desc(CommentColumn::CreatedAt)
            .paginate(self.read_conn(), page_size);

        let total = paginator.num_items().await?;
        let comments = paginator.fetch_page(page).await?;

        let authors = comments.load_one(UserEntity, self.read_conn()).await?;
        let rows = zip_authors(comments, authors)?;

        Ok((rows, total))
    }

    /// Create a comment on a review
    pub async fn create_comment(
        &self,
        review_id: Uuid,
        author_id: Uuid,
        text: String,
    ) -> Result<Comment> {
        let comment = CommentActiveModel {
            id: Set(Uuid::new_v4()),
            review_id: Set(review_id),
            author_id: Set(author_id),
            text: Set(text),
            created_at: Set(chrono::Utc::now().into()),
        };

        comment.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find a comment under a review, failing with NotFound
    pub async fn get_comment(&self, review_id: Uuid, comment_id: Uuid) -> Result<Comment> {
        CommentEntity::find_by_id(comment_id)
            .filter(CommentColumn::ReviewId.eq(review_id))
            .one(self.read_conn())
            .await?
            .ok_or_else(|| ApiError::CommentNotFound {
                id: comment_id.to_string(),
            })
    }

    /// Find a comment and its author
    pub async fn get_comment_with_author(
        &self,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(Comment, User)> {
        let comment = self.get_comment(review_id, comment_id).await?;
        let author = self
            .find_user_by_id(comment.author_id)
            .await?
            .ok_or_else(|| ApiError::Internal {
                message: "comment author row missing".to_string(),
            })?;

        Ok((comment, author))
    }

    /// Update a comment's text
    pub async fn update_comment(&self, comment: Comment, text: Option<String>) -> Result<Comment> {
        let mut active = comment.into_active_model();

        if let Some(text) = text {
            active.text = Set(text);
        }

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete a comment
    pub async fn delete_comment(&self, comment_id: Uuid) -> Result<()> {
        let result = CommentEntity::delete_by_id(comment_id)
            .exec(self.write_conn())
            .await?;

        if result.rows_affected == 0 {
            return Err(ApiError::CommentNotFound {
                id: comment_id.to_string(),
            });
        }

        Ok(())
    }
}

/// Pair loaded rows with their authors, which the foreign key
/// guarantees to exist
fn zip_authors<T>(rows: Vec<T>, authors: Vec<Option<User>>) -> Result<Vec<(T, User)>> {
    rows.into_iter()
        .zip(authors)
        .map(|(row, author)| {
            author.map(|a| (row, a)).ok_or_else(|| ApiError::Internal {
                message: "author row missing".to_string(),
            })
        })
        .collect()
}

/// Translate a unique-constraint violation on the users table
fn translate_user_unique(e: sea_orm::DbErr) -> ApiError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::AlreadyExists {
            message: "username or email is already in use".to_string(),
        },
        _ => ApiError::Database(e),
    }
}

/// Translate a unique-constraint violation on a slug column
fn translate_slug_unique(e: sea_orm::DbErr, slug: &str) -> ApiError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::AlreadyExists {
            message: format!("slug {} is already in use", slug),
        },
        _ => ApiError::Database(e),
    }
}
