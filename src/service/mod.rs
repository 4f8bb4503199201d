pub mod approval;
pub mod construction_service;
pub mod error;
pub mod materials;
pub mod pool;
pub mod progress;
pub mod review_service;
