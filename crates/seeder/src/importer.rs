//! CSV importers for the seed-data files
//!
//! The source files carry integer primary keys; rows are re-keyed to
//! UUIDs on the way in, with per-table maps carrying the foreign-key
//! references across files. Files are imported in dependency order.

use anyhow::{bail, Context};
use chrono::DateTime;
use critiq_common::db::models::{
    CategoryActiveModel, CommentActiveModel, GenreActiveModel, ReviewActiveModel, Role,
    TitleActiveModel, TitleGenreActiveModel, UserActiveModel,
};
use critiq_common::db::DbPool;
use sea_orm::{ActiveModelTrait, Set};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct GenreRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleRow {
    pub id: i64,
    pub name: String,
    pub year: i16,
    pub category: i64,
}

#[derive(Debug, Deserialize)]
pub struct GenreTitleRow {
    pub title_id: i64,
    pub genre_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRow {
    pub id: i64,
    pub title_id: i64,
    pub text: String,
    pub author: i64,
    pub score: i16,
    pub pub_date: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRow {
    pub id: i64,
    pub review_id: i64,
    pub text: String,
    pub author: i64,
    pub pub_date: String,
}

/// Imports the seed CSV files, re-keying rows to UUIDs
pub struct Importer {
    db: DbPool,
    users: HashMap<i64, Uuid>,
    categories: HashMap<i64, Uuid>,
    genres: HashMap<i64, Uuid>,
    titles: HashMap<i64, Uuid>,
    reviews: HashMap<i64, Uuid>,
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_pub_date(raw: &str) -> anyhow::Result<chrono::DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).with_context(|| format!("bad pub_date: {}", raw))
}

impl Importer {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            users: HashMap::new(),
            categories: HashMap::new(),
            genres: HashMap::new(),
            titles: HashMap::new(),
            reviews: HashMap::new(),
        }
    }

    /// Import every seed file in dependency order
    pub async fn run(&mut self, data_dir: &Path) -> anyhow::Result<()> {
        self.import_users(&data_dir.join("users.csv")).await?;
        self.import_categories(&data_dir.join("category.csv")).await?;
        self.import_genres(&data_dir.join("genre.csv")).await?;
        self.import_titles(&data_dir.join("titles.csv")).await?;
        self.import_genre_titles(&data_dir.join("genre_title.csv")).await?;
        self.import_reviews(&data_dir.join("review.csv")).await?;
        self.import_comments(&data_dir.join("comments.csv")).await?;

        Ok(())
    }

    async fn import_users(&mut self, path: &Path) -> anyhow::Result<()> {
        let rows: Vec<UserRow> = read_rows(path)?;
        let count = rows.len();

        for row in rows {
            let id = Uuid::new_v4();
            self.users.insert(row.id, id);

            UserActiveModel {
                id: Set(id),
                username: Set(row.username),
                email: Set(row.email),
                first_name: Set(row.first_name),
                last_name: Set(row.last_name),
                bio: Set(row.bio),
                role: Set(Role::from(row.role).into()),
                is_staff: Set(false),
                confirmation_code: Set(None),
                created_at: Set(chrono::Utc::now().into()),
            }
            .insert(self.db.write())
            .await?;
        }

        info!(count, "Users imported");
        Ok(())
    }

    async fn import_categories(&mut self, path: &Path) -> anyhow::Result<()> {
        let rows: Vec<CategoryRow> = read_rows(path)?;
        let count = rows.len();

        for row in rows {
            let id = Uuid::new_v4();
            self.categories.insert(row.id, id);

            CategoryActiveModel {
                id: Set(id),
                name: Set(row.name),
                slug: Set(row.slug),
            }
            .insert(self.db.write())
            .await?;
        }

        info!(count, "Categories imported");
        Ok(())
    }

    async fn import_genres(&mut self, path: &Path) -> anyhow::Result<()> {
        let rows: Vec<GenreRow> = read_rows(path)?;
        let count = rows.len();

        for row in rows {
            let id = Uuid::new_v4();
            self.genres.insert(row.id, id);

            GenreActiveModel {
                id: Set(id),
                name: Set(row.name),
                slug: Set(row.slug),
            }
            .insert(self.db.write())
            .await?;
        }

        info!(count, "Genres imported");
        Ok(())
    }

    async fn import_titles(&mut self, path: &Path) -> anyhow::Result<()> {
        let rows: Vec<TitleRow> = read_rows(path)?;
        let count = rows.len();

        for row in rows {
            let id = Uuid::new_v4();
            self.titles.insert(row.id, id);

            let Some(&category_id) = self.categories.get(&row.category) else {
                bail!("title {} references unknown category {}", row.id, row.category);
            };

            TitleActiveModel {
                id: Set(id),
                name: Set(row.name),
                year: Set(row.year),
                description: Set(None),
                category_id: Set(Some(category_id)),
            }
            .insert(self.db.write())
            .await?;
        }

        info!(count, "Titles imported");
        Ok(())
    }

    async fn import_genre_titles(&mut self, path: &Path) -> anyhow::Result<()> {
        let rows: Vec<GenreTitleRow> = read_rows(path)?;
        let count = rows.len();

        for row in rows {
            let Some(&title_id) = self.titles.get(&row.title_id) else {
                bail!("association references unknown title {}", row.title_id);
            };
            let Some(&genre_id) = self.genres.get(&row.genre_id) else {
                bail!("association references unknown genre {}", row.genre_id);
            };

            TitleGenreActiveModel {
                title_id: Set(title_id),
                genre_id: Set(genre_id),
            }
            .insert(self.db.write())
            .await?;
        }

        info!(count, "Title-genre associations imported");
        Ok(())
    }

    async fn import_reviews(&mut self, path: &Path) -> anyhow::Result<()> {
        let rows: Vec<ReviewRow> = read_rows(path)?;
        let count = rows.len();

        for row in rows {
            let id = Uuid::new_v4();
            self.reviews.insert(row.id, id);

            let Some(&title_id) = self.titles.get(&row.title_id) else {
                bail!("review {} references unknown title {}", row.id, row.title_id);
            };
            let Some(&author_id) = self.users.get(&row.author) else {
                bail!("review {} references unknown author {}", row.id, row.author);
            };

            ReviewActiveModel {
                id: Set(id),
                title_id: Set(title_id),
                author_id: Set(author_id),
                text: Set(row.text),
                score: Set(row.score),
                created_at: Set(parse_pub_date(&row.pub_date)?),
            }
            .insert(self.db.write())
            .await?;
        }

        info!(count, "Reviews imported");
        Ok(())
    }

    async fn import_comments(&mut self, path: &Path) -> anyhow::Result<()> {
        let rows: Vec<CommentRow> = read_rows(path)?;
        let count = rows.len();

        for row in rows {
            let Some(&review_id) = self.reviews.get(&row.review_id) else {
                bail!("comment {} references unknown review {}", row.id, row.review_id);
            };
            let Some(&author_id) = self.users.get(&row.author) else {
                bail!("comment {} references unknown author {}", row.id, row.author);
            };

            CommentActiveModel {
                id: Set(Uuid::new_v4()),
                review_id: Set(review_id),
                author_id: Set(author_id),
                text: Set(row.text),
                created_at: Set(parse_pub_date(&row.pub_date)?),
            }
            .insert(self.db.write())
            .await?;
        }

        info!(count, "Comments imported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_from<T: serde::de::DeserializeOwned>(data: &str) -> Vec<T> {
        csv::Reader::from_reader(data.as_bytes())
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .unwrap()
    }

    #[test]
    fn test_parse_user_row() {
        let rows: Vec<UserRow> = rows_from(
            "id,username,email,role,bio,first_name,last_name\n\
             100,capote,capote@example.com,user,,Truman,Capote\n",
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "capote");
        assert_eq!(Role::from(rows[0].role.clone()), Role::User);
        assert_eq!(rows[0].bio, "");
    }

    #[test]
    fn test_parse_title_row() {
        let rows: Vec<TitleRow> =
            rows_from("id,name,year,category\n7,In Cold Blood,1966,2\n");

        assert_eq!(rows[0].year, 1966);
        assert_eq!(rows[0].category, 2);
    }

    #[test]
    fn test_parse_review_row_dates() {
        let rows: Vec<ReviewRow> = rows_from(
            "id,title_id,text,author,score,pub_date\n\
             1,7,Chilling.,100,9,2019-09-24T21:08:21.567Z\n",
        );

        assert_eq!(rows[0].score, 9);
        assert!(parse_pub_date(&rows[0].pub_date).is_ok());
    }

    #[test]
    fn test_bad_pub_date_is_rejected() {
        assert!(parse_pub_date("24/09/2019").is_err());
    }
}
