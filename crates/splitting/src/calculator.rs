use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use tally_core::{DomainError, DomainResult, Money, ParticipantId};

use crate::expense_spec::ExpenseSpec;
use crate::split::Split;

/// Allowed drift between the declared total and user-supplied split values (0.01).
const SUM_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One participant's portion of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub participant: ParticipantId,
    pub amount: Money,
}

/// Per-participant amounts owed for one expense, in participant order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitResult {
    shares: Vec<Share>,
}

impl SplitResult {
    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    pub fn into_shares(self) -> Vec<Share> {
        self.shares
    }

    pub fn iter(&self) -> impl Iterator<Item = &Share> {
        self.shares.iter()
    }

    /// Total owed by `participant`, summing repeated entries.
    pub fn amount_for(&self, participant: &ParticipantId) -> Option<Money> {
        self.shares
            .iter()
            .filter(|s| &s.participant == participant)
            .map(|s| s.amount)
            .reduce(|a, b| a + b)
    }

    pub fn total(&self) -> Money {
        self.shares.iter().map(|s| s.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

/// Compute how much each participant owes for `spec`.
///
/// Deterministic and side-effect free. For EQUAL, PERCENT and SHARE the
/// returned amounts always sum to `spec.total` exactly.
pub fn calculate_split(spec: &ExpenseSpec) -> DomainResult<SplitResult> {
    if spec.total.is_negative() {
        return Err(DomainError::validation(format!(
            "expense amount cannot be negative ({})",
            spec.total
        )));
    }

    let count = spec.participants.len();
    if count == 0 {
        return Err(DomainError::validation(
            "expense must have at least one participant",
        ));
    }

    let amounts = match &spec.split {
        Split::Equal => equal(spec.total, count)?,
        Split::Exact(values) => {
            ensure_count(values, count, "exact amounts")?;
            exact(spec.total, values)?
        }
        Split::Percent(values) => {
            ensure_count(values, count, "percentages")?;
            percent(spec.total, values)?
        }
        Split::Share(values) => {
            ensure_count(values, count, "shares")?;
            share(spec.total, values)?
        }
    };

    let shares = spec
        .participants
        .iter()
        .cloned()
        .zip(amounts)
        .map(|(participant, amount)| Share { participant, amount })
        .collect();

    Ok(SplitResult { shares })
}

fn ensure_count(values: &[Decimal], count: usize, what: &str) -> DomainResult<()> {
    if values.len() != count {
        return Err(DomainError::validation(format!(
            "number of participants ({count}) must match number of {what} ({})",
            values.len()
        )));
    }
    Ok(())
}

fn equal(total: Money, count: usize) -> DomainResult<Vec<Money>> {
    let share = proportional(total, Decimal::ONE, Decimal::from(count))?;
    with_remainder(total, vec![share; count - 1])
}

fn exact(total: Money, values: &[Decimal]) -> DomainResult<Vec<Money>> {
    let sum = checked_sum(values)?;
    if (sum - total.to_decimal()).abs() > SUM_TOLERANCE {
        return Err(DomainError::validation(format!(
            "sum of exact amounts ({sum}) does not equal total amount ({total})"
        )));
    }
    values.iter().map(|v| Money::from_decimal(*v)).collect()
}

fn percent(total: Money, values: &[Decimal]) -> DomainResult<Vec<Money>> {
    let sum = checked_sum(values)?;
    if (sum - Decimal::ONE_HUNDRED).abs() > SUM_TOLERANCE {
        return Err(DomainError::validation(format!(
            "sum of percentages ({sum}) does not equal 100"
        )));
    }

    let leading = values[..values.len() - 1]
        .iter()
        .map(|p| proportional(total, *p, Decimal::ONE_HUNDRED))
        .collect::<DomainResult<Vec<_>>>()?;
    with_remainder(total, leading)
}

fn share(total: Money, weights: &[Decimal]) -> DomainResult<Vec<Money>> {
    if weights.iter().any(|w| *w < Decimal::ZERO) {
        return Err(DomainError::validation("share values cannot be negative"));
    }
    let total_weight = checked_sum(weights)?;
    if total_weight.is_zero() {
        return Err(DomainError::validation("total shares cannot be zero"));
    }

    let leading = weights[..weights.len() - 1]
        .iter()
        .map(|w| proportional(total, *w, total_weight))
        .collect::<DomainResult<Vec<_>>>()?;
    with_remainder(total, leading)
}

/// Append the last participant's amount so the whole reconciles to `total`.
fn with_remainder(total: Money, mut leading: Vec<Money>) -> DomainResult<Vec<Money>> {
    let distributed = leading
        .iter()
        .try_fold(Money::ZERO, |acc, m| acc.checked_add(*m))
        .ok_or_else(out_of_range)?;
    let last = total.checked_sub(distributed).ok_or_else(out_of_range)?;
    leading.push(last);
    Ok(leading)
}

/// `total * numerator / denominator`, rounded half-up to the minor unit.
fn proportional(total: Money, numerator: Decimal, denominator: Decimal) -> DomainResult<Money> {
    let minor = Decimal::from(total.minor())
        .checked_mul(numerator)
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(out_of_range)?;
    minor
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .map(Money::from_minor)
        .ok_or_else(out_of_range)
}

fn checked_sum(values: &[Decimal]) -> DomainResult<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(out_of_range)
}

fn out_of_range() -> DomainError {
    DomainError::validation("split amounts are out of range")
}
