use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::{
    errors::Result,
    middleware::UserId,
    models::{
        donation::{Donation, DonationView},
        permission::{Permission, PermissionChecker},
    },
    routes::donation_route::payload::DonationPayload,
    state::AppState,
    utils::{
        permission_context::create_context,
        upload::{remove_image, save_image},
    },
};

#[derive(Debug, Clone, Serialize)]
pub struct CreateDonationResponse {
    message: String,
    id: i64,
    donation: Donation,
    success: bool,
}

pub async fn create_donation(
    State(state): State<AppState>,
    UserId(id): UserId,
    payload: DonationPayload,
) -> Result<(StatusCode, Json<CreateDonationResponse>)> {
    let actor = create_context(&state.db, id).await?;
    actor.check_permission(&Permission::DonationCreate)?;

    let DonationPayload { fields, image } = payload;
    // Parse before touching the disk so a bad expiry leaves nothing behind.
    let mut new_donation = fields.into_new_donation(None)?;

    if let Some(image) = image {
        let stored = save_image(&state.config.upload_dir, &image.filename, &image.bytes).await?;
        new_donation.image_url = Some(stored);
    }

    let donation = match state.ledger.create_donation(&actor, new_donation.clone()).await {
        Ok(donation) => donation,
        Err(e) => {
            if let Some(stored) = &new_donation.image_url {
                remove_image(&state.config.upload_dir, stored).await;
            }
            return Err(e);
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateDonationResponse {
            message: "Donation created successfully".to_string(),
            id: donation.id,
            donation,
            success: true,
        }),
    ))
}

pub async fn list_donations(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<(StatusCode, Json<Vec<DonationView>>)> {
    let actor = create_context(&state.db, id).await?;
    let donations = state.ledger.list_donations(&actor).await?;
    Ok((StatusCode::OK, Json(donations)))
}

pub async fn get_donation(
    State(state): State<AppState>,
    UserId(id): UserId,
    Path(donation_id): Path<i64>,
) -> Result<(StatusCode, Json<DonationView>)> {
    create_context(&state.db, id).await?;
    let donation = state.ledger.get_donation(donation_id).await?;
    Ok((StatusCode::OK, Json(donation)))
}
