pub mod article;
pub mod checkpoint;

pub use article::{ArticleRow, NewArticleRow};
pub use checkpoint::CheckpointRow;
