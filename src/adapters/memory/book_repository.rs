use crate::domain::{Book, BookId, NewBook};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// In-memory implementation of BookRepository
///
/// Used for local development (`storage.backend = "memory"`) and tests.
/// IDs are assigned from a counter starting at 1 and never reused,
/// matching the behavior of a BIGSERIAL column.
pub struct BookRepository {
    state: Mutex<State>,
}

struct State {
    books: BTreeMap<BookId, Book>,
    next_id: i64,
}

impl BookRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                books: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| "in-memory book store lock poisoned".into())
    }
}

impl Default for BookRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn list(&self) -> Result<Vec<Book>> {
        Ok(self.lock()?.books.values().cloned().collect())
    }

    async fn insert(&self, new_book: NewBook) -> Result<Book> {
        let mut state = self.lock()?;

        let book_id = BookId::from_i64(state.next_id);
        state.next_id += 1;

        let book = Book::from_new(book_id, new_book);
        state.books.insert(book_id, book.clone());
        Ok(book)
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.lock()?.books.get(&book_id).cloned())
    }

    /// Overwrite an existing book; unknown IDs are not inserted
    async fn save(&self, book: &Book) -> Result<bool> {
        let mut state = self.lock()?;
        match state.books.get_mut(&book.book_id) {
            Some(stored) => {
                *stored = book.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, book_id: BookId) -> Result<bool> {
        Ok(self.lock()?.books.remove(&book_id).is_some())
    }
}
