/**
 * Dashboard Routes
 * Session-gated editing of the caller's own portfolio record
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::models::{Education, Experience, PortfolioData, PortfolioField, Project, UserRecord};
use crate::error::{AppError, AppResult};
use crate::forms::{PortfolioForm, ProjectForm};
use crate::session::Session;
use crate::state::SharedState;
use crate::store::ProfileStore;
use crate::templates::{catalog, BlogTemplate, PortfolioTemplate, TemplateKind, TemplateOption};

#[derive(Debug, Deserialize, Serialize)]
pub struct SkillRequest {
    pub skill: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CertificationRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub changed: bool,
    pub items: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsResponse {
    pub index: Option<usize>,
    pub projects: Vec<Project>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EntriesResponse<T> {
    pub index: Option<usize>,
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateChoiceRequest {
    pub template_id: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateChoiceResponse {
    pub template_id: String,
    /// Variant actually rendered for the stored id.
    pub resolved: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatesResponse {
    pub portfolio: Vec<TemplateOption>,
    pub blog: Vec<TemplateOption>,
    pub portfolio_template: String,
    pub blog_template: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FieldUpdateResponse {
    pub success: bool,
    pub field: String,
}

async fn own_record(state: &SharedState, session: &Session) -> AppResult<UserRecord> {
    state
        .store
        .get_by_uid(&session.uid)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Re-runs tags through the draft so duplicates and blanks are dropped.
fn project_draft(form: &mut ProjectForm, project: Project) {
    let tech = project.tech_stack.clone();
    *form.draft_mut() = Project {
        tech_stack: Vec::new(),
        ..project
    };
    for t in &tech {
        form.add_tech(t);
    }
}

/// GET /api/me
pub async fn get_me(
    State(state): State<SharedState>,
    session: Session,
) -> AppResult<Json<UserRecord>> {
    Ok(Json(own_record(&state, &session).await?))
}

/// PUT /api/me/portfolio
/// Replaces the whole portfolio document.
pub async fn put_portfolio(
    State(state): State<SharedState>,
    session: Session,
    Json(data): Json<PortfolioData>,
) -> AppResult<Json<PortfolioData>> {
    let form = PortfolioForm::new(&session.uid, data);
    form.save(state.store.as_ref()).await?;
    Ok(Json(form.into_data()))
}

/// PATCH /api/me/portfolio/{field}
pub async fn patch_field(
    State(state): State<SharedState>,
    session: Session,
    Path(field): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> AppResult<Json<FieldUpdateResponse>> {
    let field = PortfolioField::from_key(&field)
        .ok_or_else(|| AppError::not_found(format!("Unknown portfolio field: {}", field)))?;
    if field == PortfolioField::Name && !value.as_str().is_some_and(|s| !s.trim().is_empty()) {
        return Err(AppError::validation("Name is required"));
    }

    state
        .store
        .update_single_field(&session.uid, field, value)
        .await?;
    Ok(Json(FieldUpdateResponse {
        success: true,
        field: field.key().to_string(),
    }))
}

/// POST /api/me/skills
pub async fn add_skill(
    State(state): State<SharedState>,
    session: Session,
    Json(payload): Json<SkillRequest>,
) -> AppResult<Json<ListResponse>> {
    if payload.skill.trim().is_empty() {
        return Err(AppError::validation("Skill is required"));
    }
    let mut form = PortfolioForm::load(state.store.as_ref(), &session.uid).await?;
    let changed = form.add_skill(&payload.skill);
    if changed {
        form.save_field(state.store.as_ref(), PortfolioField::Skills)
            .await?;
    }
    Ok(Json(ListResponse {
        changed,
        items: form.into_data().skills,
    }))
}

/// DELETE /api/me/skills/{skill}
pub async fn remove_skill(
    State(state): State<SharedState>,
    session: Session,
    Path(skill): Path<String>,
) -> AppResult<Json<ListResponse>> {
    let mut form = PortfolioForm::load(state.store.as_ref(), &session.uid).await?;
    if !form.remove_skill(&skill) {
        return Err(AppError::not_found(format!("Skill not found: {}", skill)));
    }
    form.save_field(state.store.as_ref(), PortfolioField::Skills)
        .await?;
    Ok(Json(ListResponse {
        changed: true,
        items: form.into_data().skills,
    }))
}

/// POST /api/me/certifications
pub async fn add_certification(
    State(state): State<SharedState>,
    session: Session,
    Json(payload): Json<CertificationRequest>,
) -> AppResult<(StatusCode, Json<ListResponse>)> {
    let mut form = PortfolioForm::load(state.store.as_ref(), &session.uid).await?;
    if !form.add_certification(&payload.name) {
        return Err(AppError::validation("Certification name is required"));
    }
    form.save_field(state.store.as_ref(), PortfolioField::Certifications)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ListResponse {
            changed: true,
            items: form.into_data().certifications,
        }),
    ))
}

/// DELETE /api/me/certifications/{index}
pub async fn remove_certification(
    State(state): State<SharedState>,
    session: Session,
    Path(index): Path<usize>,
) -> AppResult<Json<ListResponse>> {
    let mut form = PortfolioForm::load(state.store.as_ref(), &session.uid).await?;
    form.remove_certification(index)?;
    form.save_field(state.store.as_ref(), PortfolioField::Certifications)
        .await?;
    Ok(Json(ListResponse {
        changed: true,
        items: form.into_data().certifications,
    }))
}

/// POST /api/me/experience
pub async fn add_experience(
    State(state): State<SharedState>,
    session: Session,
    Json(entry): Json<Experience>,
) -> AppResult<(StatusCode, Json<EntriesResponse<Experience>>)> {
    let mut form = PortfolioForm::load(state.store.as_ref(), &session.uid).await?;
    let index = form.add_experience();
    form.update_experience(index, entry)?;
    form.save_field(state.store.as_ref(), PortfolioField::Experience)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(EntriesResponse {
            index: Some(index),
            items: form.into_data().experience,
        }),
    ))
}

/// PUT /api/me/experience/{index}
pub async fn update_experience(
    State(state): State<SharedState>,
    session: Session,
    Path(index): Path<usize>,
    Json(entry): Json<Experience>,
) -> AppResult<Json<EntriesResponse<Experience>>> {
    let mut form = PortfolioForm::load(state.store.as_ref(), &session.uid).await?;
    form.update_experience(index, entry)?;
    form.save_field(state.store.as_ref(), PortfolioField::Experience)
        .await?;
    Ok(Json(EntriesResponse {
        index: Some(index),
        items: form.into_data().experience,
    }))
}

/// DELETE /api/me/experience/{index}
pub async fn remove_experience(
    State(state): State<SharedState>,
    session: Session,
    Path(index): Path<usize>,
) -> AppResult<Json<EntriesResponse<Experience>>> {
    let mut form = PortfolioForm::load(state.store.as_ref(), &session.uid).await?;
    form.remove_experience(index)?;
    form.save_field(state.store.as_ref(), PortfolioField::Experience)
        .await?;
    Ok(Json(EntriesResponse {
        index: None,
        items: form.into_data().experience,
    }))
}

/// POST /api/me/education
pub async fn add_education(
    State(state): State<SharedState>,
    session: Session,
    Json(entry): Json<Education>,
) -> AppResult<(StatusCode, Json<EntriesResponse<Education>>)> {
    let mut form = PortfolioForm::load(state.store.as_ref(), &session.uid).await?;
    let index = form.add_education();
    form.update_education(index, entry)?;
    form.save_field(state.store.as_ref(), PortfolioField::Education)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(EntriesResponse {
            index: Some(index),
            items: form.into_data().education,
        }),
    ))
}

/// PUT /api/me/education/{index}
pub async fn update_education(
    State(state): State<SharedState>,
    session: Session,
    Path(index): Path<usize>,
    Json(entry): Json<Education>,
) -> AppResult<Json<EntriesResponse<Education>>> {
    let mut form = PortfolioForm::load(state.store.as_ref(), &session.uid).await?;
    form.update_education(index, entry)?;
    form.save_field(state.store.as_ref(), PortfolioField::Education)
        .await?;
    Ok(Json(EntriesResponse {
        index: Some(index),
        items: form.into_data().education,
    }))
}

/// DELETE /api/me/education/{index}
pub async fn remove_education(
    State(state): State<SharedState>,
    session: Session,
    Path(index): Path<usize>,
) -> AppResult<Json<EntriesResponse<Education>>> {
    let mut form = PortfolioForm::load(state.store.as_ref(), &session.uid).await?;
    form.remove_education(index)?;
    form.save_field(state.store.as_ref(), PortfolioField::Education)
        .await?;
    Ok(Json(EntriesResponse {
        index: None,
        items: form.into_data().education,
    }))
}

/// POST /api/me/projects
pub async fn create_project(
    State(state): State<SharedState>,
    session: Session,
    Json(project): Json<Project>,
) -> AppResult<(StatusCode, Json<ProjectsResponse>)> {
    let mut form = ProjectForm::load(state.store.as_ref(), &session.uid).await?;
    project_draft(&mut form, project);
    let index = form.save_project(state.store.as_ref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProjectsResponse {
            index: Some(index),
            projects: form.projects().to_vec(),
        }),
    ))
}

/// PUT /api/me/projects/{index}
pub async fn update_project(
    State(state): State<SharedState>,
    session: Session,
    Path(index): Path<usize>,
    Json(project): Json<Project>,
) -> AppResult<Json<ProjectsResponse>> {
    let mut form = ProjectForm::load(state.store.as_ref(), &session.uid).await?;
    form.edit(index)?;
    project_draft(&mut form, project);
    let index = form.save_project(state.store.as_ref()).await?;
    Ok(Json(ProjectsResponse {
        index: Some(index),
        projects: form.projects().to_vec(),
    }))
}

/// DELETE /api/me/projects/{index}
pub async fn delete_project(
    State(state): State<SharedState>,
    session: Session,
    Path(index): Path<usize>,
) -> AppResult<Json<ProjectsResponse>> {
    let mut form = ProjectForm::load(state.store.as_ref(), &session.uid).await?;
    form.delete_project(state.store.as_ref(), index).await?;
    Ok(Json(ProjectsResponse {
        index: None,
        projects: form.projects().to_vec(),
    }))
}

/// PUT /api/me/templates/{kind}
/// Any id is stored as given; unknown ids render as variant 1.
pub async fn set_template(
    State(state): State<SharedState>,
    session: Session,
    Path(kind): Path<String>,
    Json(payload): Json<TemplateChoiceRequest>,
) -> AppResult<Json<TemplateChoiceResponse>> {
    let kind = TemplateKind::parse(&kind)
        .ok_or_else(|| AppError::not_found(format!("Unknown template kind: {}", kind)))?;

    state
        .store
        .update_template_choice(&session.uid, kind, &payload.template_id)
        .await?;

    let resolved = match kind {
        TemplateKind::Portfolio => PortfolioTemplate::resolve(Some(&payload.template_id)).id(),
        TemplateKind::Blog => BlogTemplate::resolve(Some(&payload.template_id)).id(),
    };
    tracing::info!(uid = %session.uid, kind = kind.field(), template_id = %payload.template_id, "template selected");

    Ok(Json(TemplateChoiceResponse {
        template_id: payload.template_id,
        resolved: resolved.as_str().to_string(),
    }))
}

/// GET /api/templates
pub async fn list_templates(
    State(state): State<SharedState>,
    session: Session,
) -> AppResult<Json<TemplatesResponse>> {
    let record = own_record(&state, &session).await?;
    Ok(Json(TemplatesResponse {
        portfolio: catalog(TemplateKind::Portfolio),
        blog: catalog(TemplateKind::Blog),
        portfolio_template: record.portfolio_template,
        blog_template: record.blog_template,
    }))
}
