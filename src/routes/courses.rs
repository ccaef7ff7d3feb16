// ============================================================================
// Course Routes
// ============================================================================
//
// Endpoints (academic service, all protected):
// - GET /    - Course catalog
// - GET /:id - Single course
//
// ============================================================================

use axum::{extract::Path, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::routes::extractors::AuthenticatedUser;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: u32,
    pub name: String,
}

const CATALOG: &[(u32, &str)] = &[
    (1, "Programación I"),
    (2, "Bases de Datos"),
    (3, "Sistemas Operativos"),
    (4, "Redes de Computadores"),
];

pub fn catalog() -> Vec<Course> {
    CATALOG
        .iter()
        .map(|(id, name)| Course {
            id: *id,
            name: name.to_string(),
        })
        .collect()
}

/// GET /
pub async fn list_courses(user: AuthenticatedUser) -> Json<Vec<Course>> {
    tracing::debug!(user_id = user.0.id, "Listing courses");
    Json(catalog())
}

/// GET /:id
pub async fn get_course(
    user: AuthenticatedUser,
    Path(id): Path<u32>,
) -> Result<Json<Course>, AppError> {
    tracing::debug!(user_id = user.0.id, course_id = id, "Fetching course");
    catalog()
        .into_iter()
        .find(|course| course.id == id)
        .map(Json)
        .ok_or_else(|| AppError::not_found("Course not found"))
}
