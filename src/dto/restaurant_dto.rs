use crate::model::restaurant::Restaurant;
use crate::util::upload::{MultipartForm, UploadError};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Fields of the multipart form posted to `POST /api/restaurants`.
#[derive(Debug, Clone, Validate)]
pub struct CreateRestaurantRequest {
    #[validate(length(min = 1, max = 100))]
    pub store_name: String,
    #[validate(length(min = 1, max = 100))]
    pub brand_name: String,
    #[validate(length(max = 1000))]
    pub description: String,
    #[validate(length(min = 1, max = 200))]
    pub street: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(length(min = 6, max = 20))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
}

impl CreateRestaurantRequest {
    pub fn from_form(form: &MultipartForm) -> Result<Self, UploadError> {
        Ok(CreateRestaurantRequest {
            store_name: form.required("storeName")?,
            brand_name: form.required("brandName")?,
            description: form.text("description").unwrap_or_default(),
            street: form.required("street")?,
            city: form.required("city")?,
            postal_code: form.required("postalCode")?,
            country: form.required("country")?,
            phone: form.required("phone")?,
            email: form.required("email")?.to_lowercase(),
        })
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateRestaurantRequest {
    #[validate(length(min = 1, max = 100))]
    pub store_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub brand_name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub street: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,
    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

impl UpdateRestaurantRequest {
    pub fn from_form(form: &MultipartForm) -> Self {
        UpdateRestaurantRequest {
            store_name: form.text("storeName"),
            brand_name: form.text("brandName"),
            description: form.text("description"),
            street: form.text("street"),
            city: form.text("city"),
            postal_code: form.text("postalCode"),
            country: form.text("country"),
            phone: form.text("phone"),
            email: form.text("email").map(|e| e.to_lowercase()),
        }
    }

    pub fn apply_to(self, restaurant: &mut Restaurant) {
        fn set(target: &mut String, value: Option<String>) {
            if let Some(v) = value {
                *target = v;
            }
        }
        set(&mut restaurant.store_name, self.store_name);
        set(&mut restaurant.brand_name, self.brand_name);
        set(&mut restaurant.description, self.description);
        set(&mut restaurant.street, self.street);
        set(&mut restaurant.city, self.city);
        set(&mut restaurant.postal_code, self.postal_code);
        set(&mut restaurant.country, self.country);
        set(&mut restaurant.phone, self.phone);
        set(&mut restaurant.email, self.email);
    }
}

/// Body of the availability PATCH routes for restaurants and menu items.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestaurantListQuery {
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantResponse {
    pub id: String,
    pub store_name: String,
    pub brand_name: String,
    pub description: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub is_available: bool,
    pub owner: String,
    pub image: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Restaurant> for RestaurantResponse {
    fn from(r: Restaurant) -> Self {
        RestaurantResponse {
            id: r.id.map(|id| id.to_hex()).unwrap_or_default(),
            store_name: r.store_name,
            brand_name: r.brand_name,
            description: r.description,
            street: r.street,
            city: r.city,
            postal_code: r.postal_code,
            country: r.country,
            phone: r.phone,
            email: r.email,
            is_available: r.is_available,
            owner: r.owner.to_hex(),
            image: r.image,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
