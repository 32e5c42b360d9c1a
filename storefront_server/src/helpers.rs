use actix_web::dev::ServiceRequest;

/// Determines the client IP for a request. The X-Forwarded-For header is only honoured when the deployment says it
/// sits behind a proxy that sets it; otherwise the connection's remote address is used.
pub fn client_ip(req: &ServiceRequest, use_x_forwarded_for: bool) -> Option<String> {
    if use_x_forwarded_for {
        if let Some(forwarded) = req.headers().get("X-Forwarded-For").and_then(|v| v.to_str().ok()) {
            if let Some(first) = forwarded.split(',').next() {
                let ip = first.trim();
                if !ip.is_empty() {
                    return Some(ip.to_string());
                }
            }
        }
    }
    req.connection_info().peer_addr().map(|a| a.to_string())
}
