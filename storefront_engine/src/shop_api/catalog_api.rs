use crate::{
    db_types::{Customer, NewCustomer, NewProduct, Product},
    traits::{CatalogApiError, CatalogManagement},
};

/// Thin API wrapper around the catalog and customer-directory behaviour of a backend.
#[derive(Debug, Clone)]
pub struct CatalogApi<B> {
    db: B,
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        self.db.insert_product(product).await
    }

    pub async fn product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError> {
        self.db.fetch_product(product_id).await
    }

    pub async fn products(&self) -> Result<Vec<Product>, CatalogApiError> {
        self.db.fetch_products().await
    }

    pub async fn restock_product(&self, product_id: i64, new_quantity: i64) -> Result<Product, CatalogApiError> {
        self.db.restock_product(product_id, new_quantity).await
    }

    pub async fn register_customer(&self, customer: NewCustomer) -> Result<Customer, CatalogApiError> {
        self.db.insert_customer(customer).await
    }

    pub async fn customer_by_id(&self, customer_id: &str) -> Result<Option<Customer>, CatalogApiError> {
        self.db.fetch_customer_by_id(customer_id).await
    }
}
