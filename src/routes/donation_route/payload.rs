use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    errors::{Error, Result},
    models::donation::{DEFAULT_FOOD_TYPE, NewDonation},
    utils::{time::parse_expiry, validated_form::ValidatedJson, validator::not_blank},
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDonationRequest {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub quantity: String,
    pub food_type: Option<String>,
    pub expiry_time: String,
    #[validate(custom(function = "not_blank"), length(max = 255))]
    pub location: String,
}

impl CreateDonationRequest {
    fn from_form(mut form: HashMap<String, String>) -> Result<Self> {
        let mut required = |key: &str| {
            form.remove(key)
                .ok_or_else(|| Error::Validation(format!("Missing field `{key}`")))
        };
        Ok(Self {
            title: required("title")?,
            quantity: required("quantity")?,
            expiry_time: required("expiry_time")?,
            location: required("location")?,
            description: form.remove("description").unwrap_or_default(),
            food_type: form.remove("food_type"),
        })
    }

    /// Fails with an unprocessable-expiry error rather than guessing a default.
    pub fn into_new_donation(self, image_url: Option<String>) -> Result<NewDonation> {
        let expiry_time = parse_expiry(&self.expiry_time)?;
        let food_type = self
            .food_type
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_FOOD_TYPE.to_string());

        Ok(NewDonation {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            quantity: self.quantity.trim().to_string(),
            food_type,
            location: self.location.trim().to_string(),
            image_url,
            expiry_time,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Bytes,
}

/// Donation body decoded from JSON or `multipart/form-data`, chosen by content type.
#[derive(Debug, Clone)]
pub struct DonationPayload {
    pub fields: CreateDonationRequest,
    pub image: Option<ImageUpload>,
}

impl<S> FromRequest<S> for DonationPayload
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let ValidatedJson(fields) =
                ValidatedJson::<CreateDonationRequest>::from_request(req, state).await?;
            return Ok(Self { fields, image: None });
        }

        let mut multipart = Multipart::from_request(req, state).await?;
        let mut form = HashMap::new();
        let mut image = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was picked.
                if !filename.is_empty() && !bytes.is_empty() {
                    image = Some(ImageUpload { filename, bytes });
                }
            } else {
                form.insert(name, field.text().await?);
            }
        }

        let fields = CreateDonationRequest::from_form(form)?;
        fields.validate()?;
        Ok(Self { fields, image })
    }
}
