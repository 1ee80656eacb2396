pub mod clustering;
pub mod one_hot;
pub mod tfidf;

pub use clustering::{cluster_events, DEFAULT_CLUSTERS};
pub use tfidf::{cosine_similarity, TfidfVectorizer};
