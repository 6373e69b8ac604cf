//! Text-similarity primitives shared by the career recommender and the job matcher.

pub mod stop_words;
pub mod tfidf;
