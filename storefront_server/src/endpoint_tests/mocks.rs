use mockall::mock;
use storefront_engine::{
    db_types::{CartItem, CartLine, Customer, NewCustomer, NewProduct, Order, OrderItem, Product, TxRef},
    traits::{
        CartApiError,
        CartManagement,
        CatalogApiError,
        CatalogManagement,
        CheckoutDatabase,
        CheckoutError,
        GatewayError,
        InitializeCheckout,
        NewSettlement,
        PaymentGateway,
        SettlementOutcome,
        VerifiedPayment,
    },
};

mock! {
    pub Backend {}
    impl Clone for Backend {
        fn clone(&self) -> Self;
    }
    impl CheckoutDatabase for Backend {
        async fn settle_order(&self, settlement: NewSettlement) -> Result<SettlementOutcome, CheckoutError>;
        async fn fetch_order_by_tx_ref(&self, tx_ref: &TxRef) -> Result<Option<Order>, CheckoutError>;
        async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, CheckoutError>;
        async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, CheckoutError>;
    }
    impl CartManagement for Backend {
        async fn add_cart_item(&self, customer_id: &str, product_id: i64, quantity: i64) -> Result<CartItem, CartApiError>;
        async fn fetch_cart(&self, customer_id: &str) -> Result<Vec<CartLine>, CartApiError>;
        async fn remove_cart_item(&self, customer_id: &str, product_id: i64) -> Result<u64, CartApiError>;
    }
    impl CatalogManagement for Backend {
        async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError>;
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError>;
        async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError>;
        async fn restock_product(&self, product_id: i64, new_quantity: i64) -> Result<Product, CatalogApiError>;
        async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CatalogApiError>;
        async fn fetch_customer_by_id(&self, customer_id: &str) -> Result<Option<Customer>, CatalogApiError>;
        async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CatalogApiError>;
    }
}

mock! {
    pub Gateway {}
    impl Clone for Gateway {
        fn clone(&self) -> Self;
    }
    impl PaymentGateway for Gateway {
        async fn initialize(&self, request: InitializeCheckout) -> Result<String, GatewayError>;
        async fn verify(&self, tx_ref: &TxRef) -> Result<VerifiedPayment, GatewayError>;
    }
}
