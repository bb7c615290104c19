// Repositories combine the remote sources, the local store and the error
// classifier into the operations the presentation layer calls.
mod author;
mod github_user;
mod quote;
mod search;
mod user_data;

pub use author::AuthorRepository;
pub use github_user::GithubUserRepository;
pub use quote::QuoteRepository;
pub use search::SearchRepository;
pub use user_data::UserDataRepository;
