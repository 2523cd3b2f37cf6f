use printpdf::{BuiltinFont, Mm, PdfDocument};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

use crate::models::transaction::Transaction;

/// Report service errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("No active transactions to report")]
    NoActiveTransactions,

    #[error("Report rendering failed: {0}")]
    Rendering(String),
}

/// Trait defining report rendering over a list of transactions. The
/// methods are synchronous: rendering is pure CPU work with no await
/// points.
pub trait ReportService: Send + Sync {
    /// Render the transactions as a PDF document
    fn generate_pdf_report(&self, transactions: &[Transaction]) -> Result<Vec<u8>, ReportError>;

    /// Render the transactions as an XLSX workbook
    fn generate_excel_report(&self, transactions: &[Transaction]) -> Result<Vec<u8>, ReportError>;
}

const COLUMN_HEADERS: [&str; 14] = [
    "Id",
    "Person type",
    "Operation date",
    "Transaction type",
    "Comment",
    "Amount",
    "Status",
    "Sender bank",
    "Account",
    "Receiver bank",
    "Receiver account",
    "Receiver inn",
    "Category",
    "Receiver phone",
];

// Landscape A4; rows run down the page and overflow onto fresh pages
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 12.0;
const LINE_HEIGHT: f32 = 5.0;

/// One transaction rendered as display strings, in column order
fn row_values(transaction: &Transaction) -> [String; 14] {
    [
        transaction.id.to_string(),
        transaction.person_type.as_str().to_string(),
        transaction
            .operation_date
            .format("%d.%m.%Y %H:%M")
            .to_string(),
        transaction.transaction_type.as_str().to_string(),
        transaction.comment.clone().unwrap_or_default(),
        transaction.amount.round_dp(2).to_string(),
        transaction.status.as_str().to_string(),
        transaction.sender_bank.clone(),
        transaction.account.clone(),
        transaction.receiver_bank.clone(),
        transaction.receiver_account.clone(),
        transaction.receiver_inn.clone().unwrap_or_default(),
        transaction.category.clone(),
        transaction.receiver_phone.clone().unwrap_or_default(),
    ]
}

fn render_err(e: impl std::fmt::Display) -> ReportError {
    ReportError::Rendering(e.to_string())
}

/// Implementation of ReportService
#[derive(Debug, Default)]
pub struct ReportServiceImpl;

impl ReportServiceImpl {
    pub fn new() -> Self {
        Self
    }
}

impl ReportService for ReportServiceImpl {
    fn generate_pdf_report(&self, transactions: &[Transaction]) -> Result<Vec<u8>, ReportError> {
        let (doc, first_page, first_layer) = PdfDocument::new(
            "Transactions report",
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "transactions",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(render_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(render_err)?;

        let mut layer = doc.get_page(first_page).get_layer(first_layer);
        let mut y = PAGE_HEIGHT - MARGIN;

        layer.use_text("Transactions report", 14.0, Mm(MARGIN), Mm(y), &bold);
        y -= LINE_HEIGHT * 2.0;

        layer.use_text(COLUMN_HEADERS.join(" | "), 8.0, Mm(MARGIN), Mm(y), &bold);
        y -= LINE_HEIGHT;

        for transaction in transactions {
            if y < MARGIN {
                let (page, page_layer) =
                    doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "transactions");
                layer = doc.get_page(page).get_layer(page_layer);
                y = PAGE_HEIGHT - MARGIN;
            }
            let line = row_values(transaction).join(" | ");
            layer.use_text(line, 8.0, Mm(MARGIN), Mm(y), &regular);
            y -= LINE_HEIGHT;
        }

        doc.save_to_bytes().map_err(render_err)
    }

    fn generate_excel_report(&self, transactions: &[Transaction]) -> Result<Vec<u8>, ReportError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let money = Format::new().set_num_format("#,##0.00");

        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Transactions").map_err(render_err)?;

        for (col, header) in COLUMN_HEADERS.iter().enumerate() {
            worksheet
                .write_with_format(0, col as u16, *header, &bold)
                .map_err(render_err)?;
        }

        for (index, transaction) in transactions.iter().enumerate() {
            let row = index as u32 + 1;
            let values = row_values(transaction);
            for (col, value) in values.iter().enumerate() {
                // Column 5 is the amount; everything else is text
                if col == 5 {
                    let amount = transaction.amount.to_f64().unwrap_or_default();
                    worksheet
                        .write_with_format(row, col as u16, amount, &money)
                        .map_err(render_err)?;
                } else {
                    worksheet
                        .write(row, col as u16, value.as_str())
                        .map_err(render_err)?;
                }
            }
        }

        workbook.save_to_buffer().map_err(render_err)
    }
}
