//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into a separate
//! module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the backend traits, so the endpoint tests can run them against mocks. actix cannot
//! register generic handlers through the attribute macros, so everything except `health` is wired up explicitly in
//! [`crate::server`].
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use storefront_engine::{
    db_types::{NewCustomer, NewProduct, TxRef},
    traits::{CartManagement, CatalogManagement, CheckoutDatabase, PaymentGateway},
    CartApi,
    CatalogApi,
    CheckoutApi,
};

use crate::{
    data_objects::{
        AddCartItemRequest,
        CheckoutRequest,
        CheckoutResponse,
        JsonResponse,
        NewCustomerRequest,
        NewProductRequest,
        PaymentNotification,
        PaymentVerifiedResponse,
    },
    errors::ServerError,
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Catalog  ----------------------------------------------------
pub async fn create_product<B: CatalogManagement>(
    api: web::Data<CatalogApi<B>>,
    body: web::Json<NewProductRequest>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    debug!("💻️ POST product '{}'", req.name);
    let product = api
        .insert_product(NewProduct {
            name: req.name,
            description: req.description,
            price: req.price,
            stock_quantity: req.stock_quantity,
            category: req.category,
        })
        .await?;
    Ok(HttpResponse::Created().json(product))
}

pub async fn list_products<B: CatalogManagement>(
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET products");
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

pub async fn register_customer<B: CatalogManagement>(
    api: web::Data<CatalogApi<B>>,
    body: web::Json<NewCustomerRequest>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    debug!("💻️ POST customer {}", req.customer_id);
    let customer = api
        .register_customer(NewCustomer {
            customer_id: req.customer_id,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;
    Ok(HttpResponse::Created().json(customer))
}

//----------------------------------------------     Cart   ----------------------------------------------------
pub async fn add_cart_item<B: CartManagement>(
    api: web::Data<CartApi<B>>,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    debug!("💻️ POST cart line for {}: {} x product #{}", req.customer_id, req.quantity, req.product_id);
    let item = api.add_item(&req.customer_id, req.product_id, req.quantity).await?;
    Ok(HttpResponse::Created().json(item))
}

pub async fn get_cart<B: CartManagement>(
    path: web::Path<String>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let customer_id = path.into_inner();
    debug!("💻️ GET cart for {customer_id}");
    let lines = api.cart(&customer_id).await?;
    Ok(HttpResponse::Ok().json(lines))
}

pub async fn remove_cart_item<B: CartManagement>(
    path: web::Path<(String, i64)>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (customer_id, product_id) = path.into_inner();
    debug!("💻️ DELETE cart line for {customer_id}: product #{product_id}");
    let removed = api.remove_item(&customer_id, product_id).await?;
    if removed == 0 {
        return Err(ServerError::NoRecordFound(format!("Product #{product_id} is not in the cart")));
    }
    Ok(HttpResponse::Ok().json(JsonResponse::new("Removed")))
}

//----------------------------------------------   Checkout  ---------------------------------------------------
/// Route handler for the checkout endpoint.
///
/// Validates the customer's cart, opens a payment session with the gateway, and returns the hosted checkout URL
/// the client must redirect to. No stock moves here; the cart stays as-is until the payment webhook settles it.
pub async fn checkout<B, G>(
    api: web::Data<CheckoutApi<B, G>>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + CartManagement + CatalogManagement,
    G: PaymentGateway,
{
    let customer_id = body.into_inner().customer_id;
    debug!("💻️ POST checkout for {customer_id}");
    let session = api.initiate_checkout(&customer_id).await?;
    let response = CheckoutResponse {
        checkout_url: session.checkout_url,
        tx_ref: session.tx_ref,
        amount: session.amount,
        items: session.items,
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Route handler for the payment webhook.
///
/// The gateway posts here after a payment attempt. The endpoint is unauthenticated by design: nothing in the body
/// is trusted beyond the reference, which is independently verified against the gateway before settlement.
/// Deliveries may repeat or arrive out of order; handling is idempotent per reference.
pub async fn verify_payment<B, G>(
    api: web::Data<CheckoutApi<B, G>>,
    body: web::Json<PaymentNotification>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + CartManagement + CatalogManagement,
    G: PaymentGateway,
{
    let notification = body.into_inner();
    if notification.tx_ref.is_empty() {
        return Err(ServerError::InvalidRequestBody("Missing tx_ref".to_string()));
    }
    let tx_ref = TxRef::from(notification.tx_ref);
    debug!("💻️ Payment webhook received for {tx_ref}");
    let settled = api.handle_payment_webhook(&tx_ref).await?;
    let message = if settled.newly_settled {
        "Payment verified and order created successfully"
    } else {
        "Payment already settled"
    };
    let response = PaymentVerifiedResponse {
        message: message.to_string(),
        order_id: settled.order.order_id.clone(),
        tx_ref: settled.order.tx_ref.clone(),
        amount: settled.order.total_amount,
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------    Orders   ---------------------------------------------------
pub async fn order_history<B, G>(
    path: web::Path<String>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + CartManagement + CatalogManagement,
    G: PaymentGateway,
{
    let customer_id = path.into_inner();
    debug!("💻️ GET orders for {customer_id}");
    let orders = api.order_history(&customer_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}
