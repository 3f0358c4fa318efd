//! `mult <amount>`: a table of multiples for splitting costs.

use async_trait::async_trait;

use super::{ChatContext, Handler};

const MULTIPLIERS: [u32; 12] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 25, 50, 100];

/// Amounts above this get no reply.
const MAX_AMOUNT: f64 = 1000.0;

pub struct MultiplesHandler;

/// `Multiples of $A | $2A | ... | $100A`, or `None` for unusable amounts.
pub fn multiples(args: &str) -> Option<String> {
    let amount: f64 = args.trim_start_matches('$').parse().ok()?;
    if !amount.is_finite() || amount > MAX_AMOUNT {
        return None;
    }

    let mut text = format!("Multiples of ${amount:.2}");
    for multiplier in MULTIPLIERS {
        text.push_str(&format!(" | ${:.2}", amount * f64::from(multiplier)));
    }
    Some(text)
}

#[async_trait]
impl Handler for MultiplesHandler {
    async fn handle(&self, _ctx: &ChatContext, args: &str) -> Option<String> {
        multiples(args)
    }
}
