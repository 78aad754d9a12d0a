pub mod credentials;
pub mod poster_profile;

pub use credentials::Credentials;
pub use poster_profile::{NoImagePolicy, PosterProfile};
