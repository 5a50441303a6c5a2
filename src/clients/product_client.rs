use tracing::{debug, instrument};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::domain::{Product, ProductCreate};
use crate::product_actor::ProductError;

/// Client for interacting with the Product actor.
#[derive(Clone, Debug)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self), fields(product_name = %product.name))]
    pub async fn create_product(&self, product: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.create(product).await.map_err(|e| match e {
            FrameworkError::Rejected(reason) => ProductError::Invalid(reason),
            other => ProductError::ActorCommunicationError(other.to_string()),
        })
    }
}
