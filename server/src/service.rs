//! In-memory to-do storage and the operations over it.
//!
//! # Design
//! Storage is a plain `Vec<Todo>` kept in insertion order with no index, so
//! every lookup is a linear scan. A single `RwLock` guards the whole vector
//! and every operation holds it for its full duration: readers share it,
//! `add_todo` and `delete_todo_by_id` take it exclusively.
//!
//! Ids are caller-supplied and duplicates are accepted. A lookup that finds
//! more than one record reports [`ServiceError::AmbiguousId`] rather than
//! picking one; a delete removes every match.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::model::Todo;

pub type SharedService = Arc<TodoService>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{matches} to-dos share id {id}")]
    AmbiguousId { id: i32, matches: usize },
}

#[derive(Debug, Default)]
pub struct TodoService {
    todos: RwLock<Vec<Todo>>,
}

impl TodoService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored to-do, in insertion order.
    pub async fn list_todos(&self) -> Vec<Todo> {
        self.todos.read().await.clone()
    }

    /// Returns the one to-do with `id`, or `None` when nothing matches.
    pub async fn get_todo_by_id(&self, id: i32) -> Result<Option<Todo>, ServiceError> {
        let todos = self.todos.read().await;
        let mut matching = todos.iter().filter(|todo| todo.id == id);
        let Some(first) = matching.next() else {
            return Ok(None);
        };
        let extra = matching.count();
        if extra > 0 {
            return Err(ServiceError::AmbiguousId {
                id,
                matches: extra + 1,
            });
        }
        Ok(Some(first.clone()))
    }

    /// Appends `todo` and hands it back unchanged.
    pub async fn add_todo(&self, todo: Todo) -> Todo {
        let mut todos = self.todos.write().await;
        todos.push(todo.clone());
        debug!(id = todo.id, stored = todos.len(), "to-do added");
        todo
    }

    /// Removes every to-do with `id` and returns how many went away.
    pub async fn delete_todo_by_id(&self, id: i32) -> usize {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|todo| todo.id != id);
        let removed = before - todos.len();
        debug!(id, removed, "to-dos deleted");
        removed
    }

    pub async fn len(&self) -> usize {
        self.todos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.todos.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn todo(id: i32, name: &str) -> Todo {
        Todo {
            id,
            name: name.to_string(),
            due_date: Utc.with_ymd_and_hms(2031, 6, 1, 12, 0, 0).unwrap(),
            is_completed: false,
        }
    }

    #[tokio::test]
    async fn new_service_is_empty() {
        let service = TodoService::new();
        assert!(service.is_empty().await);
        assert!(service.list_todos().await.is_empty());
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let service = TodoService::new();
        for (id, name) in [(3, "c"), (1, "a"), (2, "b")] {
            service.add_todo(todo(id, name)).await;
        }
        let ids: Vec<i32> = service.list_todos().await.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn add_returns_record_unchanged() {
        let service = TodoService::new();
        let added = service.add_todo(todo(42, "Answer")).await;
        assert_eq!(added, todo(42, "Answer"));
        assert_eq!(service.len().await, 1);
    }

    #[tokio::test]
    async fn get_finds_single_match() {
        let service = TodoService::new();
        service.add_todo(todo(1, "one")).await;
        service.add_todo(todo(2, "two")).await;
        let found = service.get_todo_by_id(2).await.unwrap();
        assert_eq!(found, Some(todo(2, "two")));
    }

    #[tokio::test]
    async fn get_missing_id_is_none() {
        let service = TodoService::new();
        service.add_todo(todo(1, "one")).await;
        assert_eq!(service.get_todo_by_id(99).await, Ok(None));
    }

    #[tokio::test]
    async fn get_duplicate_id_is_ambiguous() {
        let service = TodoService::new();
        service.add_todo(todo(5, "first")).await;
        service.add_todo(todo(5, "second")).await;
        service.add_todo(todo(5, "third")).await;
        assert_eq!(
            service.get_todo_by_id(5).await,
            Err(ServiceError::AmbiguousId { id: 5, matches: 3 })
        );
    }

    #[tokio::test]
    async fn delete_removes_every_match() {
        let service = TodoService::new();
        service.add_todo(todo(5, "first")).await;
        service.add_todo(todo(6, "keep")).await;
        service.add_todo(todo(5, "second")).await;

        assert_eq!(service.delete_todo_by_id(5).await, 2);
        assert_eq!(service.list_todos().await, vec![todo(6, "keep")]);
        assert_eq!(service.get_todo_by_id(5).await, Ok(None));
    }

    #[tokio::test]
    async fn delete_missing_id_is_noop() {
        let service = TodoService::new();
        service.add_todo(todo(1, "one")).await;
        assert_eq!(service.delete_todo_by_id(2).await, 0);
        assert_eq!(service.len().await, 1);
    }

    #[tokio::test]
    async fn list_is_a_snapshot() {
        let service = TodoService::new();
        service.add_todo(todo(1, "one")).await;
        let snapshot = service.list_todos().await;
        service.delete_todo_by_id(1).await;
        assert_eq!(snapshot.len(), 1);
        assert!(service.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_are_all_kept() {
        let service: SharedService = Arc::new(TodoService::new());
        let mut tasks = tokio::task::JoinSet::new();
        for id in 0..64 {
            let service = Arc::clone(&service);
            tasks.spawn(async move {
                service.add_todo(todo(id, "parallel")).await;
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }
        assert_eq!(service.len().await, 64);
    }
}
