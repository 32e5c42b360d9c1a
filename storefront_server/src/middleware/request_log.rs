//! Request-logging and blocklist middleware.
//!
//! Every request passing through this middleware is appended to the request log that feeds the suspicious-IP
//! scanner, and requests from IPs that have already been flagged are rejected with 403 before the handler runs.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorForbidden, ErrorInternalServerError},
    Error,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;
use storefront_engine::{traits::AbuseTracking, AbuseApi};

use crate::helpers::client_ip;

pub struct RequestLogMiddlewareFactory<B: AbuseTracking> {
    api: AbuseApi<B>,
    use_x_forwarded_for: bool,
}

impl<B: AbuseTracking> RequestLogMiddlewareFactory<B> {
    pub fn new(api: AbuseApi<B>, use_x_forwarded_for: bool) -> Self {
        Self { api, use_x_forwarded_for }
    }
}

impl<S, B, Body> Transform<S, ServiceRequest> for RequestLogMiddlewareFactory<B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<Body>, Error = Error> + 'static,
    S::Future: 'static,
    B: AbuseTracking + 'static,
    Body: 'static,
{
    type Response = ServiceResponse<Body>;
    type Error = Error;
    type Transform = RequestLogMiddlewareService<S, B>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLogMiddlewareService {
            api: self.api.clone(),
            use_x_forwarded_for: self.use_x_forwarded_for,
            service: Rc::new(service),
        })
    }
}

pub struct RequestLogMiddlewareService<S, B: AbuseTracking> {
    api: AbuseApi<B>,
    use_x_forwarded_for: bool,
    service: Rc<S>,
}

impl<S, B, Body> Service<ServiceRequest> for RequestLogMiddlewareService<S, B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<Body>, Error = Error> + 'static,
    S::Future: 'static,
    B: AbuseTracking + 'static,
    Body: 'static,
{
    type Response = ServiceResponse<Body>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let api = self.api.clone();
        let use_x_forwarded_for = self.use_x_forwarded_for;
        Box::pin(async move {
            let ip = client_ip(&req, use_x_forwarded_for);
            if let Some(ip) = ip {
                let flagged = api.is_flagged(&ip).await.map_err(|e| {
                    error!("💻️ Could not check the blocklist for {ip}. {e}");
                    ErrorInternalServerError("Blocklist check failed")
                })?;
                if flagged {
                    debug!("💻️ Rejecting request from flagged IP {ip}");
                    return Err(ErrorForbidden("Access denied."));
                }
                if let Err(e) = api.record_request(ip.clone(), req.path().to_string()).await {
                    // A full request log is not worth failing the request over.
                    warn!("💻️ Could not record request from {ip}. {e}");
                }
            } else {
                warn!("💻️ No client IP could be determined for {}. Request not logged", req.path());
            }
            service.call(req).await
        })
    }
}
