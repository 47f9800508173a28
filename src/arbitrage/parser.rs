use tracing::debug;

use crate::types::{
    ParsedRows, PriceQuote, RejectionReason, RowRejection, PRICE_VENUE_A_COLUMN,
    PRICE_VENUE_B_COLUMN, REQUIRED_COLUMNS, TIMESTAMP_COLUMN, TOKEN_IN_COLUMN, TOKEN_OUT_COLUMN,
};

/// Splits a batch of raw rows into validated quotes and rejections.
///
/// Every row ends up in exactly one of the two outputs, and both keep the
/// relative order of the input.
pub fn parse_rows<R, S>(rows: &[R]) -> ParsedRows
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut parsed = ParsedRows::default();

    for (index, row) in rows.iter().enumerate() {
        match parse_row(row.as_ref()) {
            Ok(quote) => parsed.quotes.push(quote),
            Err(reason) => {
                debug!("Rejecting row #{}: {}", index, reason);
                parsed.rejections.push(RowRejection {
                    row_index: index,
                    reason,
                    row: row.as_ref().iter().map(|c| c.as_ref().to_string()).collect(),
                });
            }
        }
    }

    parsed
}

/// Validates a single row. Cells past the fifth are ignored.
pub fn parse_row<S: AsRef<str>>(row: &[S]) -> Result<PriceQuote, RejectionReason> {
    if row.len() < REQUIRED_COLUMNS {
        return Err(RejectionReason::MissingFields);
    }

    let timestamp = row[TIMESTAMP_COLUMN].as_ref();
    if timestamp.trim().is_empty() {
        return Err(RejectionReason::MissingFields);
    }

    let token_in = row[TOKEN_IN_COLUMN].as_ref().trim();
    let token_out = row[TOKEN_OUT_COLUMN].as_ref().trim();
    if token_in.is_empty() || token_out.is_empty() {
        return Err(RejectionReason::MissingToken);
    }

    let price_venue_a = parse_price(row[PRICE_VENUE_A_COLUMN].as_ref())?;
    let price_venue_b = parse_price(row[PRICE_VENUE_B_COLUMN].as_ref())?;

    Ok(PriceQuote {
        timestamp: timestamp.to_string(),
        token_in: token_in.to_string(),
        token_out: token_out.to_string(),
        price_venue_a,
        price_venue_b,
    })
}

/// The whole trimmed cell must be a number; trailing garbage such as `"310.5abc"` is rejected.
fn parse_price(cell: &str) -> Result<f64, RejectionReason> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Err(RejectionReason::MissingFields);
    }

    let value = cell
        .parse::<f64>()
        .map_err(|_| RejectionReason::NonNumericPrice)?;

    if !value.is_finite() {
        return Err(RejectionReason::NonFiniteValue);
    }
    if value < 0.0 {
        return Err(RejectionReason::NegativePrice);
    }

    Ok(value)
}
