// Post acquisition: where the raw posts of a run come from.
pub mod reddit;
pub mod traits;

pub use reddit::RedditSource;
pub use traits::PostSource;
