pub mod db;
pub mod constructiondb;
pub mod memorydb;
