pub mod council;
pub mod health;
pub mod info;
pub mod jobs;
pub mod models;
pub mod stream;
