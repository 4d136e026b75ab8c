use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tees,
    Hoodies,
    Sweats,
    Hats,
    Accessories,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Tees,
        Category::Hoodies,
        Category::Sweats,
        Category::Hats,
        Category::Accessories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tees => "tees",
            Category::Hoodies => "hoodies",
            Category::Sweats => "sweats",
            Category::Hats => "hats",
            Category::Accessories => "accessories",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Tees => "Tees",
            Category::Hoodies => "Hoodies",
            Category::Sweats => "Sweats",
            Category::Hats => "Hats",
            Category::Accessories => "Accessories",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::Tees => "Premium cotton tees",
            Category::Hoodies => "Cozy streetwear hoodies",
            Category::Sweats => "Comfortable sweatpants",
            Category::Hats => "Caps and beanies",
            Category::Accessories => "Bags, jewelry & more",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl From<Category> for CategoryInfo {
    fn from(category: Category) -> Self {
        CategoryInfo {
            id: category.as_str(),
            name: category.display_name(),
            description: category.description(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub image_url: String,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub featured: bool,
    pub new_arrival: bool,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

fn default_sizes() -> Vec<String> {
    ["S", "M", "L", "XL", "XXL"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

// For creating new products
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    pub category: Category,
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image_url: String,
    #[serde(default = "default_sizes")]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub new_arrival: bool,
    #[serde(default = "default_true")]
    pub in_stock: bool,
}

impl From<CreateProduct> for Product {
    fn from(payload: CreateProduct) -> Self {
        Product {
            id: Uuid::new_v4().to_string(),
            name: payload.name,
            description: payload.description,
            price: payload.price,
            category: payload.category,
            image_url: payload.image_url,
            sizes: payload.sizes,
            colors: payload.colors,
            featured: payload.featured,
            new_arrival: payload.new_arrival,
            in_stock: payload.in_stock,
            created_at: Utc::now(),
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_arrival: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

impl UpdateProduct {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
            && self.sizes.is_none()
            && self.colors.is_none()
            && self.featured.is_none()
            && self.new_arrival.is_none()
            && self.in_stock.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub new_arrival: Option<bool>,
}

impl ProductQuery {
    /// Store filter requiring every supplied field to match.
    pub fn to_filter(&self) -> Document {
        let mut filter = doc! {};
        if let Some(category) = &self.category {
            filter.insert("category", category.as_str());
        }
        if let Some(featured) = self.featured {
            filter.insert("featured", featured);
        }
        if let Some(new_arrival) = self.new_arrival {
            filter.insert("new_arrival", new_arrival);
        }
        filter
    }
}
