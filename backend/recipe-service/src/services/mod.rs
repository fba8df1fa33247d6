pub mod chef;
pub mod corpus;
pub mod ensemble;
pub mod ingredients;
pub mod scoring;
pub mod similarity;
pub mod store;
pub mod vectorize;

pub use chef::ChefModel;
pub use ensemble::{Recommender, RecommendationEnsemble};
pub use vectorize::{TfidfVectorizer, VectorizeError};
