use crate::model::menu_item::MenuItem;
use crate::util::upload::{MultipartForm, UploadError};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Validate)]
pub struct CreateMenuItemRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 0.01))]
    pub price: f64,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(max = 500))]
    pub description: String,
}

impl CreateMenuItemRequest {
    pub fn from_form(form: &MultipartForm) -> Result<Self, UploadError> {
        let price = form
            .parse::<f64>("price")?
            .ok_or_else(|| UploadError::MissingField("price".into()))?;
        Ok(CreateMenuItemRequest {
            name: form.required("name")?,
            price,
            category: form.required("category")?,
            description: form.text("description").unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateMenuItemRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(range(min = 0.01))]
    pub price: Option<f64>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub is_available: Option<bool>,
}

impl UpdateMenuItemRequest {
    pub fn from_form(form: &MultipartForm) -> Result<Self, UploadError> {
        Ok(UpdateMenuItemRequest {
            name: form.text("name"),
            price: form.parse::<f64>("price")?,
            category: form.text("category"),
            description: form.text("description"),
            is_available: form.parse::<bool>("isAvailable")?,
        })
    }

    pub fn apply_to(self, item: &mut MenuItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(available) = self.is_available {
            item.is_available = available;
        }
    }
}

/// `?restaurantId=` filter used by the public menu listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuQuery {
    pub restaurant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemResponse {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    pub image: Option<String>,
    pub is_available: bool,
    pub restaurant: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<MenuItem> for MenuItemResponse {
    fn from(m: MenuItem) -> Self {
        MenuItemResponse {
            id: m.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: m.name,
            price: m.price,
            category: m.category,
            description: m.description,
            image: m.image,
            is_available: m.is_available,
            restaurant: m.restaurant.to_hex(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_is_parsed_from_text() {
        let mut form = MultipartForm::default();
        form.fields.insert("name".into(), "Kottu".into());
        form.fields.insert("price".into(), "4.50".into());
        form.fields.insert("category".into(), "Mains".into());

        let req = CreateMenuItemRequest::from_form(&form).unwrap();
        assert_eq!(req.price, 4.5);
        assert!(req.validate().is_ok());

        form.fields.insert("price".into(), "cheap".into());
        assert!(matches!(
            CreateMenuItemRequest::from_form(&form),
            Err(UploadError::InvalidField(f)) if f == "price"
        ));
    }

    #[test]
    fn zero_price_fails_validation() {
        let req = CreateMenuItemRequest {
            name: "Tea".into(),
            price: 0.0,
            category: "Drinks".into(),
            description: String::new(),
        };
        assert!(req.validate().is_err());
    }
}
