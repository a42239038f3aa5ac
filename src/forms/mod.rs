//! Edit surface: working copies of a principal's data that are only written
//! back to the store on an explicit save.

pub mod blog;
pub mod portfolio;
pub mod projects;

pub use blog::{BlogDraft, BlogForm};
pub use portfolio::{ImageSlot, PortfolioForm};
pub use projects::ProjectForm;

use crate::error::{AppError, AppResult};

/// Appends a trimmed tag unless it is blank or already present.
///
/// Comparison is exact, so "Rust" and "rust" are distinct tags.
pub fn push_unique(list: &mut Vec<String>, raw: &str) -> bool {
    let tag = raw.trim();
    if tag.is_empty() || list.iter().any(|existing| existing == tag) {
        return false;
    }
    list.push(tag.to_string());
    true
}

/// Removes every exact occurrence of `tag`.
pub fn remove_exact(list: &mut Vec<String>, tag: &str) -> bool {
    let before = list.len();
    list.retain(|existing| existing != tag);
    list.len() != before
}

fn check_index<T>(list: &[T], index: usize, what: &str) -> AppResult<()> {
    if index < list.len() {
        Ok(())
    } else {
        Err(AppError::not_found(format!("{} {} not found", what, index)))
    }
}

fn require(value: &str, message: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        Err(AppError::validation(message))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_unique_trims_and_dedupes() {
        let mut skills = Vec::new();
        assert!(push_unique(&mut skills, " Rust "));
        assert!(!push_unique(&mut skills, "Rust"));
        assert!(!push_unique(&mut skills, "   "));
        assert!(push_unique(&mut skills, "rust"));
        assert_eq!(skills, vec!["Rust", "rust"]);
    }

    #[test]
    fn test_remove_exact_is_case_sensitive() {
        let mut skills = vec!["Rust".to_string(), "Go".to_string()];
        assert!(!remove_exact(&mut skills, "rust"));
        assert!(remove_exact(&mut skills, "Rust"));
        assert_eq!(skills, vec!["Go"]);
    }
}
