use crate::{
    db_types::{Customer, NewCustomer, NewProduct, Product},
    traits::CatalogApiError,
};

/// Read/write access to the product catalog and the customer directory.
///
/// The catalog is a collaborator of the checkout core: products are shared (read) by many cart and order records,
/// but stock is only ever decremented through the settlement path in [`crate::traits::CheckoutDatabase`]. The
/// `restock_product` method is the administrative exception.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement: Clone {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError>;

    /// All products, newest first.
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError>;

    /// Sets a product's stock to an absolute value. Administrative restocking only.
    async fn restock_product(&self, product_id: i64, new_quantity: i64) -> Result<Product, CatalogApiError>;

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CatalogApiError>;

    async fn fetch_customer_by_id(&self, customer_id: &str) -> Result<Option<Customer>, CatalogApiError>;

    async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CatalogApiError>;
}
