//! Pricing Service
//!
//! `subscriptionPrice = basePrice + pricePerCreditLine * creditLines
//!                      + pricePerCreditScorePoint * creditScore`
//!
//! Every call reads the whole row collection; nothing is cached between calls.

use serde::{de, Deserialize, Deserializer, Serialize};
use subprice_common::{Result, Row, RowStore};
use tracing::debug;

/// Caller-supplied linear pricing parameters
///
/// Each field accepts a JSON number or a numeric string. Values are not
/// range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingCoefficients {
    #[serde(deserialize_with = "number_or_string")]
    pub base_price: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub price_per_credit_line: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub price_per_credit_score_point: f64,
}

impl PricingCoefficients {
    pub fn new(base_price: f64, price_per_credit_line: f64, price_per_credit_score_point: f64) -> Self {
        Self {
            base_price,
            price_per_credit_line,
            price_per_credit_score_point,
        }
    }

    /// Price for one credit profile
    pub fn price(&self, credit_lines: f64, credit_score: f64) -> f64 {
        self.base_price
            + self.price_per_credit_line * credit_lines
            + self.price_per_credit_score_point * credit_score
    }

    /// Price for a stored row; `None` when either input field is missing
    pub fn price_row(&self, row: &Row) -> Option<f64> {
        match (row.credit_lines, row.credit_score) {
            (Some(lines), Some(score)) => Some(self.price(lines, score)),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| de::Error::custom(format!("'{}' is not a number", s))),
    }
}

/// A stored row with its computed price
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedRow {
    #[serde(flatten)]
    pub row: Row,
    /// Null when the row lacks a credit score or credit line count
    pub subscription_price: Option<f64>,
}

/// Price every stored row
pub async fn calculate(store: &RowStore, coefficients: PricingCoefficients) -> Result<Vec<PricedRow>> {
    let rows = store.find_all().await?;

    let priced: Vec<PricedRow> = rows
        .into_iter()
        .map(|row| {
            let subscription_price = coefficients.price_row(&row);
            PricedRow {
                row,
                subscription_price,
            }
        })
        .collect();

    let unpriced = priced.iter().filter(|p| p.subscription_price.is_none()).count();
    if unpriced > 0 {
        debug!("{} of {} rows lack pricing inputs", unpriced, priced.len());
    }

    Ok(priced)
}
