use crate::db::models::{coerce_years, Education, Experience, PortfolioData, PortfolioField};
use crate::error::{AppError, AppResult};
use crate::image::ImageRef;
use crate::store::{ProfileStore, Store};

use super::{check_index, push_unique, remove_exact, require};

/// Where an inline profile image goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Profile,
    Cover,
}

impl ImageSlot {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "profile" => Some(ImageSlot::Profile),
            "cover" => Some(ImageSlot::Cover),
            _ => None,
        }
    }

    pub fn field(self) -> PortfolioField {
        match self {
            ImageSlot::Profile => PortfolioField::ProfileImage,
            ImageSlot::Cover => PortfolioField::CoverImage,
        }
    }
}

/// Working copy of one principal's `portfolioData`.
#[derive(Debug, Clone)]
pub struct PortfolioForm {
    uid: String,
    data: PortfolioData,
}

impl PortfolioForm {
    pub fn new(uid: impl Into<String>, data: PortfolioData) -> Self {
        Self {
            uid: uid.into(),
            data,
        }
    }

    pub async fn load(store: &dyn Store, uid: &str) -> AppResult<Self> {
        let record = store
            .get_by_uid(uid)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        Ok(Self::new(uid, record.portfolio_data))
    }

    pub fn data(&self) -> &PortfolioData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut PortfolioData {
        &mut self.data
    }

    pub fn into_data(self) -> PortfolioData {
        self.data
    }

    pub fn add_skill(&mut self, raw: &str) -> bool {
        push_unique(&mut self.data.skills, raw)
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        remove_exact(&mut self.data.skills, skill)
    }

    /// Appends a blank entry and returns its index.
    pub fn add_experience(&mut self) -> usize {
        self.data.experience.push(Experience::default());
        self.data.experience.len() - 1
    }

    pub fn update_experience(&mut self, index: usize, entry: Experience) -> AppResult<()> {
        check_index(&self.data.experience, index, "Experience")?;
        self.data.experience[index] = entry;
        Ok(())
    }

    pub fn remove_experience(&mut self, index: usize) -> AppResult<Experience> {
        check_index(&self.data.experience, index, "Experience")?;
        Ok(self.data.experience.remove(index))
    }

    pub fn add_education(&mut self) -> usize {
        self.data.education.push(Education::default());
        self.data.education.len() - 1
    }

    pub fn update_education(&mut self, index: usize, entry: Education) -> AppResult<()> {
        check_index(&self.data.education, index, "Education")?;
        self.data.education[index] = entry;
        Ok(())
    }

    pub fn remove_education(&mut self, index: usize) -> AppResult<Education> {
        check_index(&self.data.education, index, "Education")?;
        Ok(self.data.education.remove(index))
    }

    /// Certifications are an ordered list; duplicates are allowed.
    pub fn add_certification(&mut self, raw: &str) -> bool {
        let name = raw.trim();
        if name.is_empty() {
            return false;
        }
        self.data.certifications.push(name.to_string());
        true
    }

    pub fn remove_certification(&mut self, index: usize) -> AppResult<String> {
        check_index(&self.data.certifications, index, "Certification")?;
        Ok(self.data.certifications.remove(index))
    }

    pub fn set_years_of_experience(&mut self, raw: &str) {
        self.data.years_of_experience = coerce_years(raw);
    }

    pub fn set_image(&mut self, slot: ImageSlot, image: ImageRef) {
        match slot {
            ImageSlot::Profile => self.data.profile_image = Some(image),
            ImageSlot::Cover => self.data.cover_image = Some(image),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        require(&self.data.name, "Name is required")
    }

    /// Writes the whole document.
    pub async fn save(&self, store: &dyn Store) -> AppResult<()> {
        self.validate()?;
        store
            .update_whole_profile(&self.uid, self.data.clone())
            .await?;
        tracing::info!(uid = %self.uid, "portfolio saved");
        Ok(())
    }

    /// Writes one top-level field as it stands in the working copy.
    pub async fn save_field(&self, store: &dyn Store, field: PortfolioField) -> AppResult<()> {
        if field == PortfolioField::Name {
            self.validate()?;
        }
        let mut document = serde_json::to_value(&self.data)
            .map_err(|e| AppError::Backend(e.to_string()))?;
        let value = document
            .get_mut(field.key())
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null);

        store.update_single_field(&self.uid, field, value).await?;
        tracing::debug!(uid = %self.uid, field = field.key(), "portfolio field saved");
        Ok(())
    }
}
