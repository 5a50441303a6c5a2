use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{to_cents, Product, ProductCreate};

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Product from creation parameters.
    ///
    /// # Errors
    /// Stock can never be negative, even when the caller skipped validation.
    fn from_create(id: String, params: ProductCreate) -> Result<Self, FrameworkError> {
        if params.in_stock < 0 {
            return Err(FrameworkError::Rejected(format!(
                "Stock cannot be negative: {}",
                params.in_stock
            )));
        }
        Ok(Self {
            id,
            name: params.name,
            description: params.description,
            price: to_cents(params.price),
            category: params.category,
            image_url: params.image_url,
            in_stock: params.in_stock,
        })
    }
}
