mod book_service;
mod errors;

pub use book_service::{
    ServiceDependencies, create_book, delete_book, give_back_book, list_books, show_book,
    update_book,
};
pub use errors::{BookApplicationError, Result};
