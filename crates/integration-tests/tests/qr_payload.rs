//! Integration tests for the bank-transfer QR payload.

use mobigear_core::{OrderId, PaymentMethodId, Price};
use mobigear_storefront::models::PaymentMethod;
use mobigear_storefront::services::qr::{render_svg, transfer_payload};

fn bank_transfer() -> PaymentMethod {
    PaymentMethod {
        id: PaymentMethodId::new(2),
        name: "Chuyển khoản ngân hàng".to_owned(),
        code: "bank_transfer".to_owned(),
        description: "Chuyển khoản qua ngân hàng".to_owned(),
        icon: "bi-bank".to_owned(),
        is_active: true,
        bank_name: "Vietcombank".to_owned(),
        bank_account: "1234567890".to_owned(),
        bank_holder: "MOBIGEAR".to_owned(),
    }
}

#[test]
fn test_payload_references_order() {
    let payload = transfer_payload(
        &bank_transfer(),
        Price::from_vnd(428_000),
        OrderId::new(1207),
        "Tran Thi B",
    );

    // The transfer content line is what ties the payment to the order
    assert!(payload.contains("Content: DH1207 - Tran Thi B"));
    assert!(payload.contains("Amount: 428000"));
    assert!(payload.contains("Bank: Vietcombank"));
    assert!(payload.contains("Account: 1234567890"));
    assert!(payload.contains("Name: MOBIGEAR"));
}

#[test]
fn test_payload_renders_to_svg() {
    let payload = transfer_payload(
        &bank_transfer(),
        Price::from_vnd(100_000),
        OrderId::new(1),
        "Nguyen Van A",
    );

    let svg = render_svg(&payload).expect("payload encodes into a QR code");
    assert!(svg.starts_with("<?xml") || svg.contains("<svg"));
}

#[test]
fn test_only_bank_transfer_supports_qr() {
    let mut method = bank_transfer();
    assert!(method.supports_qr());

    method.code = "cod".to_owned();
    assert!(!method.supports_qr());

    method.code = "bank_transfer".to_owned();
    method.bank_account = String::new();
    assert!(!method.supports_qr());
}
