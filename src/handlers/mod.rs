pub mod categories;
pub mod coupons;
pub mod customers;
pub mod orders;
pub mod products;

use std::str::FromStr;

use actix_web::HttpRequest;
use bigdecimal::BigDecimal;

use crate::errors::AppError;

/// Parse a decimal request field sent as a string (e.g. "9.99").
pub(crate) fn parse_money(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid {field} '{raw}': {e}")))
}

/// Originating network address, used for the one-redemption-per-client
/// coupon policy. Proxy headers are honoured; the port, when present, is
/// stripped so one client maps to one address.
pub(crate) fn client_addr(req: &HttpRequest) -> String {
    let info = req.connection_info();
    match info.realip_remote_addr() {
        Some(addr) => match addr.parse::<std::net::SocketAddr>() {
            Ok(sock) => sock.ip().to_string(),
            Err(_) => addr.to_string(),
        },
        None => "unknown".to_string(),
    }
}
