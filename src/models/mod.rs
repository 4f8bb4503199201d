pub mod constructionmodel;
pub mod requestmodel;
