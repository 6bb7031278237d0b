use crate::models::{CostSummary, FormattedCost};

const ZERO_DECIMAL_CURRENCIES: &[&str] = &["VND", "JPY", "KRW", "IDR"];

/// Renders `amount` with thousands separators and the currency code, e.g.
/// `15,000 VND` or `12.50 USD`.
pub fn format_amount(amount: f64, currency: &str) -> String {
    let code = currency.trim().to_ascii_uppercase();
    let decimals = if ZERO_DECIMAL_CURRENCIES.contains(&code.as_str()) {
        0
    } else {
        2
    };
    let amount = if amount.is_finite() { amount } else { 0.0 };

    let rendered = format!("{:.*}", decimals, amount.abs());
    let (whole, fraction) = match rendered.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (rendered.as_str(), None),
    };
    let negative = amount < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0');

    let mut out = String::with_capacity(rendered.len() + code.len() + 8);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    if !code.is_empty() {
        out.push(' ');
        out.push_str(&code);
    }
    out
}

pub fn format_summary(summary: &CostSummary) -> Option<FormattedCost> {
    let currency = summary.currency.as_deref()?;
    Some(FormattedCost {
        total_min: format_amount(summary.total_min, currency),
        total_max: format_amount(summary.total_max, currency),
        average_cost: format_amount(summary.average_cost, currency),
    })
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
