use crate::db::models::{PortfolioField, Project};
use crate::error::{AppError, AppResult};
use crate::store::{ProfileStore, Store};

use super::{check_index, push_unique, remove_exact, require};

/// Working copy of the project list plus one draft being edited.
///
/// Every save writes the entire `projects` array back in one update.
#[derive(Debug, Clone)]
pub struct ProjectForm {
    uid: String,
    projects: Vec<Project>,
    draft: Project,
    editing: Option<usize>,
}

impl ProjectForm {
    pub fn new(uid: impl Into<String>, projects: Vec<Project>) -> Self {
        Self {
            uid: uid.into(),
            projects,
            draft: Project::default(),
            editing: None,
        }
    }

    pub async fn load(store: &dyn Store, uid: &str) -> AppResult<Self> {
        let record = store
            .get_by_uid(uid)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        Ok(Self::new(uid, record.portfolio_data.projects))
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn draft(&self) -> &Project {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Project {
        &mut self.draft
    }

    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    pub fn add_tech(&mut self, raw: &str) -> bool {
        push_unique(&mut self.draft.tech_stack, raw)
    }

    pub fn remove_tech(&mut self, tech: &str) -> bool {
        remove_exact(&mut self.draft.tech_stack, tech)
    }

    /// Loads project `index` into the draft.
    pub fn edit(&mut self, index: usize) -> AppResult<()> {
        check_index(&self.projects, index, "Project")?;
        self.draft = self.projects[index].clone();
        self.editing = Some(index);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.draft = Project::default();
        self.editing = None;
    }

    /// Appends the draft, or replaces the entry being edited, and writes the
    /// whole list. Returns the draft's index in the saved list.
    pub async fn save_project(&mut self, store: &dyn Store) -> AppResult<usize> {
        require(&self.draft.title, "Project title is required")?;

        let mut next = self.projects.clone();
        let index = match self.editing {
            Some(i) => {
                check_index(&next, i, "Project")?;
                next[i] = self.draft.clone();
                i
            }
            None => {
                next.push(self.draft.clone());
                next.len() - 1
            }
        };

        self.write(store, &next).await?;
        self.projects = next;
        self.reset();
        Ok(index)
    }

    pub async fn delete_project(&mut self, store: &dyn Store, index: usize) -> AppResult<Project> {
        check_index(&self.projects, index, "Project")?;

        let mut next = self.projects.clone();
        let removed = next.remove(index);
        self.write(store, &next).await?;
        self.projects = next;

        match self.editing {
            Some(i) if i == index => self.reset(),
            Some(i) if i > index => self.editing = Some(i - 1),
            _ => {}
        }
        Ok(removed)
    }

    async fn write(&self, store: &dyn Store, projects: &[Project]) -> AppResult<()> {
        let value =
            serde_json::to_value(projects).map_err(|e| AppError::Backend(e.to_string()))?;
        store
            .update_single_field(&self.uid, PortfolioField::Projects, value)
            .await?;
        tracing::debug!(uid = %self.uid, count = projects.len(), "projects saved");
        Ok(())
    }
}
