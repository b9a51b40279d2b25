mod common;

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{line, TestApp};
use tradedocs_api::{
    errors::ServiceError,
    services::{
        conversion::{
            ConvertRequest, ExportOrderOptions, ProformaOptions, PurchaseOrderOptions,
            ShippingBillOptions,
        },
        documents::ActionRequest,
        enquiries::EnquiryInput,
    },
    workflow::{DocumentKind, DocumentStatus, WorkflowAction},
};

fn enquiry_input(buyer_id: uuid::Uuid) -> EnquiryInput {
    EnquiryInput {
        buyer_id,
        subject: "Cotton poplin for spring collection".to_string(),
        source: Some("email".to_string()),
        document_date: None,
        required_by: None,
        currency: Some("INR".to_string()),
        exchange_rate: None,
        notes: None,
        terms: None,
        created_by: Some("asha".to_string()),
        items: vec![line("Cotton poplin 40s", 1000, 120), line("Cotton voile 60s", 500, 180)],
    }
}

#[tokio::test]
async fn enquiry_flows_through_to_shipping_bill_and_purchase_order() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let buyer = app.seed_buyer().await;
    let supplier = app.seed_supplier().await;

    // Enquiry
    let enquiry = services.enquiries.create(enquiry_input(buyer)).await.unwrap();
    assert_eq!(enquiry.document.status, DocumentStatus::Draft);
    assert!(enquiry.document.number.starts_with("ENQ-"));
    let enquiry = services
        .enquiries
        .apply_action(enquiry.document.id, WorkflowAction::Submit, ActionRequest::by("asha"))
        .await
        .unwrap();
    assert_eq!(enquiry.document.status, DocumentStatus::Pending);

    // Quote
    let quote = services
        .conversion
        .enquiry_to_quote(enquiry.document.id, ConvertRequest::default())
        .await
        .unwrap();
    assert_eq!(quote.source_status, DocumentStatus::Converted);
    assert_eq!(quote.target_kind, DocumentKind::Quote);
    assert_eq!(quote.items.len(), 2);
    let converted = services.enquiries.get(enquiry.document.id).await.unwrap();
    assert_eq!(converted.document.converted_to_id, Some(quote.target_id));

    let submitted = services
        .quotes
        .apply_action(quote.target_id, WorkflowAction::Submit, ActionRequest::by("ravi"))
        .await
        .unwrap();
    assert_eq!(submitted.document.status, DocumentStatus::Approved);
    assert_eq!(submitted.document.grand_total, dec!(210000));

    // Proforma invoice
    let proforma = services
        .conversion
        .quote_to_proforma(
            quote.target_id,
            ProformaOptions {
                port_of_loading: Some("Nhava Sheva".to_string()),
                final_destination: Some("Germany".to_string()),
                freight: dec!(4500),
                insurance: dec!(500),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let pi = services.proforma_invoices.get(proforma.target_id).await.unwrap();
    assert_eq!(pi.document.grand_total, dec!(215000));
    for action in [WorkflowAction::Submit, WorkflowAction::Approve] {
        services
            .proforma_invoices
            .apply_action(proforma.target_id, action, ActionRequest::by("meera"))
            .await
            .unwrap();
    }

    // Export order
    let order = services
        .conversion
        .proforma_to_export_order(
            proforma.target_id,
            ExportOrderOptions {
                buyer_po_number: Some("NH-7781".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let eo = services
        .export_orders
        .apply_action(order.target_id, WorkflowAction::Confirm, ActionRequest::by("meera"))
        .await
        .unwrap();
    assert_eq!(eo.document.status, DocumentStatus::Confirmed);
    assert_eq!(eo.document.final_destination.as_deref(), Some("Germany"));

    // Purchase order leaves the export order where it was
    let po = services
        .conversion
        .export_order_to_purchase_order(
            order.target_id,
            PurchaseOrderOptions {
                supplier_id: supplier,
                expected_delivery: None,
                delivery_address: None,
                currency: None,
                exchange_rate: None,
                actor: None,
                note: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(po.target_kind, DocumentKind::PurchaseOrder);
    assert_eq!(po.source_status, DocumentStatus::Confirmed);
    let raised = services
        .purchase_orders
        .list_for_export_order(order.target_id)
        .await
        .unwrap();
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].supplier_id, supplier);

    // Shipping bill
    let sb = services
        .conversion
        .export_order_to_shipping_bill(
            order.target_id,
            ShippingBillOptions {
                port_code: Some("innsa1".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let bill = services.shipping_bills.get(sb.target_id).await.unwrap();
    assert_eq!(bill.document.port_code, "INNSA1");
    assert_eq!(bill.document.country_of_destination, "Germany");
    assert_eq!(bill.document.fob_value, dec!(210000));
    assert_eq!(bill.items.len(), 2);

    let eo = services.export_orders.get(order.target_id).await.unwrap();
    assert_eq!(eo.document.status, DocumentStatus::Converted);
}

#[tokio::test]
async fn converting_twice_is_refused() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let buyer = app.seed_buyer().await;

    let enquiry = services.enquiries.create(enquiry_input(buyer)).await.unwrap();
    services
        .enquiries
        .apply_action(enquiry.document.id, WorkflowAction::Submit, ActionRequest::default())
        .await
        .unwrap();
    services
        .conversion
        .enquiry_to_quote(enquiry.document.id, ConvertRequest::default())
        .await
        .unwrap();

    let again = services
        .conversion
        .enquiry_to_quote(enquiry.document.id, ConvertRequest::default())
        .await;
    assert_matches!(again, Err(ServiceError::Workflow(_)));
}

#[tokio::test]
async fn draft_enquiry_cannot_be_converted() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let buyer = app.seed_buyer().await;

    let enquiry = services.enquiries.create(enquiry_input(buyer)).await.unwrap();
    let result = services
        .conversion
        .enquiry_to_quote(enquiry.document.id, ConvertRequest::default())
        .await;
    assert_matches!(result, Err(ServiceError::Workflow(_)));
}

#[tokio::test]
async fn shipping_bill_needs_a_port_code() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let buyer = app.seed_buyer().await;

    let order = services
        .export_orders
        .create(tradedocs_api::services::export_orders::ExportOrderInput {
            buyer_id: buyer,
            consignee_id: None,
            buyer_po_number: None,
            document_date: None,
            expected_ship_date: None,
            currency: Some("INR".to_string()),
            exchange_rate: None,
            port_of_loading: None,
            port_of_discharge: None,
            final_destination: Some("Netherlands".to_string()),
            incoterms: Some("FOB".to_string()),
            payment_terms: None,
            freight: Decimal::ZERO,
            insurance: Decimal::ZERO,
            notes: None,
            terms: None,
            created_by: None,
            items: vec![line("Linen blend", 200, 300)],
        })
        .await
        .unwrap();
    services
        .export_orders
        .apply_action(order.document.id, WorkflowAction::Confirm, ActionRequest::default())
        .await
        .unwrap();

    let missing = services
        .conversion
        .export_order_to_shipping_bill(order.document.id, ShippingBillOptions::default())
        .await;
    assert_matches!(missing, Err(ServiceError::ValidationError(_)));

    // The refused conversion left the order untouched
    let eo = services.export_orders.get(order.document.id).await.unwrap();
    assert_eq!(eo.document.status, DocumentStatus::Confirmed);
}

#[tokio::test]
async fn purchase_order_needs_a_confirmed_export_order_and_a_supplier() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let buyer = app.seed_buyer().await;
    let supplier = app.seed_supplier().await;

    let order = services
        .export_orders
        .create(tradedocs_api::services::export_orders::ExportOrderInput {
            buyer_id: buyer,
            consignee_id: None,
            buyer_po_number: None,
            document_date: None,
            expected_ship_date: None,
            currency: Some("INR".to_string()),
            exchange_rate: None,
            port_of_loading: None,
            port_of_discharge: None,
            final_destination: None,
            incoterms: None,
            payment_terms: None,
            freight: Decimal::ZERO,
            insurance: Decimal::ZERO,
            notes: None,
            terms: None,
            created_by: None,
            items: vec![line("Denim 12oz", 300, 250)],
        })
        .await
        .unwrap();
    let options = |supplier_id| PurchaseOrderOptions {
        supplier_id,
        expected_delivery: None,
        delivery_address: None,
        currency: None,
        exchange_rate: None,
        actor: None,
        note: None,
    };

    let draft = services
        .conversion
        .export_order_to_purchase_order(order.document.id, options(supplier))
        .await;
    assert_matches!(draft, Err(ServiceError::InvalidStatus(_)));

    services
        .export_orders
        .apply_action(order.document.id, WorkflowAction::Confirm, ActionRequest::default())
        .await
        .unwrap();

    // A buyer is not a supplier
    let wrong_party = services
        .conversion
        .export_order_to_purchase_order(order.document.id, options(buyer))
        .await;
    assert!(wrong_party.is_err());

    for _ in 0..2 {
        services
            .conversion
            .export_order_to_purchase_order(order.document.id, options(supplier))
            .await
            .unwrap();
    }
    let raised = services
        .purchase_orders
        .list_for_export_order(order.document.id)
        .await
        .unwrap();
    assert_eq!(raised.len(), 2);
    assert_ne!(raised[0].number, raised[1].number);
}

#[tokio::test]
async fn purchase_order_in_the_order_currency_reuses_its_rate() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let buyer = app.seed_buyer().await;
    let supplier = app.seed_supplier().await;

    let order = services
        .export_orders
        .create(tradedocs_api::services::export_orders::ExportOrderInput {
            buyer_id: buyer,
            consignee_id: None,
            buyer_po_number: None,
            document_date: None,
            expected_ship_date: None,
            currency: Some("USD".to_string()),
            exchange_rate: Some(dec!(83)),
            port_of_loading: None,
            port_of_discharge: None,
            final_destination: None,
            incoterms: None,
            payment_terms: None,
            freight: Decimal::ZERO,
            insurance: Decimal::ZERO,
            notes: None,
            terms: None,
            created_by: None,
            items: vec![line("Denim 12oz", 300, 4)],
        })
        .await
        .unwrap();
    services
        .export_orders
        .apply_action(order.document.id, WorkflowAction::Confirm, ActionRequest::default())
        .await
        .unwrap();

    let in_currency = |currency: &str| PurchaseOrderOptions {
        supplier_id: supplier,
        expected_delivery: None,
        delivery_address: None,
        currency: Some(currency.to_string()),
        exchange_rate: None,
        actor: None,
        note: None,
    };

    let raised = services
        .conversion
        .export_order_to_purchase_order(order.document.id, in_currency("usd"))
        .await
        .unwrap();
    let po = services.purchase_orders.get(raised.target_id).await.unwrap();
    assert_eq!(po.document.currency, "USD");
    assert_eq!(po.document.exchange_rate, dec!(83));
    assert_eq!(po.document.base_grand_total, dec!(99600));

    // Any other foreign currency still needs its own rate
    let euro = services
        .conversion
        .export_order_to_purchase_order(order.document.id, in_currency("EUR"))
        .await;
    assert_matches!(euro, Err(ServiceError::ValidationError(_)));
}
