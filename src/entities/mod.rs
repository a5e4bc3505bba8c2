pub mod client;
pub mod country;
pub mod film;
pub mod film_country;
pub mod film_genre;
pub mod film_writer;
pub mod genre;
pub mod person;
pub mod rental;
pub mod role;
pub mod trailer;
pub mod writer;
