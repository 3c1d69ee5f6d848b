//! SeaORM entity models
//!
//! Database entities for Critiq

mod category;
mod comment;
mod genre;
mod review;
mod title;
mod title_genre;
mod user;

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
    Role,
};

pub use category::{
    Entity as CategoryEntity,
    Model as Category,
    ActiveModel as CategoryActiveModel,
    Column as CategoryColumn,
};

pub use genre::{
    Entity as GenreEntity,
    Model as Genre,
    ActiveModel as GenreActiveModel,
    Column as GenreColumn,
};

pub use title::{
    Entity as TitleEntity,
    Model as Title,
    ActiveModel as TitleActiveModel,
    Column as TitleColumn,
    Relation as TitleRelation,
};

pub use title_genre::{
    Entity as TitleGenreEntity,
    Model as TitleGenre,
    ActiveModel as TitleGenreActiveModel,
    Column as TitleGenreColumn,
    Relation as TitleGenreRelation,
};

pub use review::{
    Entity as ReviewEntity,
    Model as Review,
    ActiveModel as ReviewActiveModel,
    Column as ReviewColumn,
};

pub use comment::{
    Entity as CommentEntity,
    Model as Comment,
    ActiveModel as CommentActiveModel,
    Column as CommentColumn,
};
