// Shared document plumbing
pub mod documents;
pub mod history;
pub mod line_items;
pub mod numbering;

// Trade documents
pub mod enquiries;
pub mod export_orders;
pub mod proforma_invoices;
pub mod purchase_orders;
pub mod quotes;
pub mod shipping_bills;

// Document chain
pub mod conversion;

// Master data
pub mod business_entities;
pub mod products;
pub mod skus;

// Money and files
pub mod attachments;
pub mod bulk_upload;
pub mod payments;

// Output
pub mod rendering;
