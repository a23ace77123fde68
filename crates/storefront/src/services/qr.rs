//! Bank-transfer QR code generation.
//!
//! Orders paid by bank transfer get a QR code encoding the transfer details
//! so the customer can scan it in their banking app. The code is rendered to
//! SVG once at order creation and stored on the order row.

use qrcode::QrCode;
use qrcode::render::svg;
use thiserror::Error;

use mobigear_core::{OrderId, Price};

use crate::models::order::PaymentMethod;

/// QR generation failure.
#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
}

/// Build the transfer payload encoded into the QR code.
///
/// The content line `DH{order_id} - {name}` is what ties the incoming bank
/// transfer back to the order.
#[must_use]
pub fn transfer_payload(
    method: &PaymentMethod,
    total: Price,
    order_id: OrderId,
    full_name: &str,
) -> String {
    format!(
        "Bank: {}\nAccount: {}\nName: {}\nAmount: {}\nContent: DH{} - {}",
        method.bank_name,
        method.bank_account,
        method.bank_holder,
        total.amount(),
        order_id,
        full_name,
    )
}

/// Render a payload as an SVG QR code.
///
/// # Errors
///
/// Returns `QrError::Encode` if the payload cannot be encoded.
pub fn render_svg(payload: &str) -> Result<String, QrError> {
    let code = QrCode::new(payload.as_bytes())?;
    let image = code
        .render::<svg::Color<'_>>()
        .min_dimensions(240, 240)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobigear_core::PaymentMethodId;

    fn bank_transfer() -> PaymentMethod {
        PaymentMethod {
            id: PaymentMethodId::new(2),
            name: "Chuyển khoản ngân hàng".to_owned(),
            code: "bank_transfer".to_owned(),
            description: String::new(),
            icon: "bi-bank".to_owned(),
            is_active: true,
            bank_name: "Vietcombank".to_owned(),
            bank_account: "1234567890".to_owned(),
            bank_holder: "MOBIGEAR".to_owned(),
        }
    }

    #[test]
    fn test_transfer_payload_contents() {
        let payload = transfer_payload(
            &bank_transfer(),
            Price::from_vnd(255_000),
            OrderId::new(42),
            "Nguyen Van A",
        );

        assert!(payload.contains("Bank: Vietcombank"));
        assert!(payload.contains("Account: 1234567890"));
        assert!(payload.contains("Name: MOBIGEAR"));
        assert!(payload.contains("Amount: 255000"));
        assert!(payload.contains("Content: DH42 - Nguyen Van A"));
    }

    #[test]
    fn test_render_svg() {
        let payload = transfer_payload(
            &bank_transfer(),
            Price::from_vnd(100_000),
            OrderId::new(1),
            "Test",
        );
        let svg = render_svg(&payload).expect("payload encodes");
        assert!(svg.contains("<svg"));
    }
}
