// ABOUTME: Route handlers for family member profiles
// ABOUTME: Profiles carry the stats behind calorie targets in generated plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Family routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intelligence::EnergyNeeds;
use crate::models::{ActivityLevel, FamilyMember, Gender, NutritionGoal};
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Request body for creating or updating a family member
#[derive(Debug, Deserialize)]
pub struct FamilyMemberBody {
    /// Display name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// "male" or "female"
    pub gender: String,
    /// Height in centimeters
    pub height_cm: f64,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Activity level string
    #[serde(default)]
    pub activity_level: Option<String>,
    /// Nutritional goal string
    #[serde(default)]
    pub goal: Option<String>,
    /// Dietary preferences and restrictions
    #[serde(default)]
    pub preferences: Vec<String>,
    /// Optional goal deadline (YYYY-MM-DD)
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

/// Family member with computed energy needs
#[derive(Debug, Serialize)]
pub struct FamilyMemberResponse {
    /// The profile
    #[serde(flatten)]
    pub member: FamilyMember,
    /// Computed BMR/TDEE/target, absent if stats are out of range
    pub energy_needs: Option<EnergyNeeds>,
}

impl From<FamilyMember> for FamilyMemberResponse {
    fn from(member: FamilyMember) -> Self {
        let energy_needs = EnergyNeeds::for_member(&member).ok();
        Self {
            member,
            energy_needs,
        }
    }
}

/// Family routes handler
pub struct FamilyRoutes;

impl FamilyRoutes {
    /// Create all family routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/family", get(Self::handle_list))
            .route("/api/family", post(Self::handle_create))
            .route("/api/family/:id", get(Self::handle_get))
            .route("/api/family/:id", put(Self::handle_update))
            .route("/api/family/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    fn member_from_body(id: Uuid, body: FamilyMemberBody) -> Result<FamilyMember, AppError> {
        let name = body.name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_input("Member name cannot be empty"));
        }

        let member = FamilyMember {
            id,
            name: name.to_owned(),
            age: body.age,
            gender: Gender::parse(&body.gender),
            height_cm: body.height_cm,
            weight_kg: body.weight_kg,
            activity_level: body
                .activity_level
                .as_deref()
                .map_or_else(ActivityLevel::default, ActivityLevel::parse),
            goal: body
                .goal
                .as_deref()
                .map_or_else(NutritionGoal::default, NutritionGoal::parse),
            preferences: body.preferences,
            deadline: body.deadline,
        };

        // Reject stats the calorie math cannot work with
        EnergyNeeds::for_member(&member)?;
        Ok(member)
    }

    /// Handle GET /api/family
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let members = resources.database.family().list(user.id).await?;
        let response: Vec<FamilyMemberResponse> = members.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/family
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<FamilyMemberBody>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let member = Self::member_from_body(Uuid::new_v4(), body)?;
        resources.database.family().create(user.id, &member).await?;
        let response: FamilyMemberResponse = member.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/family/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let member = resources
            .database
            .family()
            .get(user.id, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Family member {id}")))?;
        let response: FamilyMemberResponse = member.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/family/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<FamilyMemberBody>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let member = Self::member_from_body(id, body)?;
        resources.database.family().update(user.id, &member).await?;
        let response: FamilyMemberResponse = member.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/family/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        resources.database.family().delete(user.id, id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
