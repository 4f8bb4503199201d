// service/pool.rs
//
// Client payments on one side, the spendable project pool on the other.
// Nothing here is cached: the balance is derived from the project each time.
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_traits::Zero;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::constructionmodel::*,
    service::{error::ServiceError, materials::materials_total},
    utils::money::positive_amount,
};

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolBalance {
    pub total_cost: BigDecimal,
    pub material_cost: BigDecimal,
    pub salaries_cost: BigDecimal,
    pub remaining_pool: BigDecimal,
}

impl PoolBalance {
    /// Everything already spent or committed against the pool.
    pub fn committed(&self) -> BigDecimal {
        &self.material_cost + &self.salaries_cost
    }
}

pub fn pool_balance(project: &Project) -> PoolBalance {
    let total_cost = project.estimated_cost.clone();
    let material_cost = materials_total(&project.materials);
    let salaries_cost: BigDecimal = project.allocations.iter().map(|a| &a.amount).sum();
    let remaining_pool = &total_cost - &material_cost - &salaries_cost;

    PoolBalance {
        total_cost,
        material_cost,
        salaries_cost,
        remaining_pool,
    }
}

/// Fails when materials and allocations no longer fit inside the estimated
/// cost. Run after any change that grows spend or shrinks the pool.
pub fn ensure_covered(project: &Project) -> Result<PoolBalance, ServiceError> {
    let balance = pool_balance(project);
    if balance.remaining_pool < BigDecimal::zero() {
        return Err(ServiceError::InsufficientPool {
            requested: balance.committed(),
            available: balance.total_cost.clone(),
        });
    }
    Ok(balance)
}

/// Appends an allocation if the pool can cover it.
pub fn allocate(
    project: &mut Project,
    recipient: String,
    amount: BigDecimal,
    category: AllocationCategory,
    note: Option<String>,
) -> Result<PoolAllocation, ServiceError> {
    if recipient.trim().is_empty() {
        return Err(ServiceError::Validation("Recipient is required".to_string()));
    }
    let amount = positive_amount("amount", amount)?;

    let balance = pool_balance(project);
    if amount > balance.remaining_pool {
        let available = if balance.remaining_pool < BigDecimal::zero() {
            BigDecimal::zero()
        } else {
            balance.remaining_pool
        };
        return Err(ServiceError::InsufficientPool {
            requested: amount,
            available,
        });
    }

    let allocation = PoolAllocation {
        id: Uuid::new_v4(),
        recipient: recipient.trim().to_string(),
        amount,
        category,
        note,
        created_at: Utc::now(),
    };
    project.allocations.push(allocation.clone());
    Ok(allocation)
}

/// Installments may split a payment but never exceed it. Amounts are
/// rounded to kobo in place.
pub fn validate_schedule(payment: &mut Payment) -> Result<(), ServiceError> {
    payment.amount = positive_amount("payment amount", payment.amount.clone())?;

    let mut scheduled = BigDecimal::zero();
    for installment in payment.installments.iter_mut() {
        installment.amount = positive_amount("installment amount", installment.amount.clone())?;
        scheduled += &installment.amount;
    }
    if scheduled > payment.amount {
        return Err(ServiceError::Validation(format!(
            "Installments total {} exceeds payment amount {}",
            scheduled, payment.amount
        )));
    }
    Ok(())
}

/// Settles a payment and any installments still open.
/// Returns false when the payment was already paid.
pub fn mark_paid(payment: &mut Payment, now: DateTime<Utc>) -> bool {
    if payment.status == PaymentStatus::Paid {
        return false;
    }

    payment.status = PaymentStatus::Paid;
    payment.paid_at = Some(now);
    for installment in payment.installments.iter_mut() {
        if installment.status == InstallmentStatus::Pending {
            installment.status = InstallmentStatus::Paid;
            installment.paid_at = Some(now);
        }
    }
    true
}

/// Settles one installment; when none are left open the parent payment is
/// settled as well. Returns false when nothing changed.
pub fn pay_installment(
    payment: &mut Payment,
    installment_id: Uuid,
    now: DateTime<Utc>,
) -> Result<bool, ServiceError> {
    let installment = payment
        .installments
        .iter_mut()
        .find(|i| i.id == installment_id)
        .ok_or(ServiceError::InstallmentNotFound(installment_id))?;

    if installment.status == InstallmentStatus::Paid {
        return Ok(false);
    }
    installment.status = InstallmentStatus::Paid;
    installment.paid_at = Some(now);

    let all_paid = payment
        .installments
        .iter()
        .all(|i| i.status == InstallmentStatus::Paid);
    if all_paid && payment.status != PaymentStatus::Paid {
        payment.status = PaymentStatus::Paid;
        payment.paid_at = Some(now);
    }
    Ok(true)
}

/// Totals of client payments: (paid, outstanding).
pub fn payment_totals(payments: &[Payment]) -> (BigDecimal, BigDecimal) {
    let mut paid = BigDecimal::zero();
    let mut outstanding = BigDecimal::zero();
    for payment in payments {
        if payment.status == PaymentStatus::Paid {
            paid += &payment.amount;
            continue;
        }
        let settled: BigDecimal = payment
            .installments
            .iter()
            .filter(|i| i.status == InstallmentStatus::Paid)
            .map(|i| &i.amount)
            .sum();
        outstanding += &payment.amount - &settled;
        paid += settled;
    }
    (paid, outstanding)
}
