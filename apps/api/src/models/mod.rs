pub mod article;
pub mod post;
