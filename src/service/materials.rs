// service/materials.rs
use std::collections::HashSet;

use bigdecimal::BigDecimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::constructionmodel::Material,
    service::error::ServiceError,
    utils::money::{ensure_non_negative, non_negative_amount, round_money, QUANTITY_SCALE},
};

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLine {
    pub id: Uuid,
    pub name: String,
    pub total_cost: BigDecimal,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaterialsSummary {
    pub per_item_totals: Vec<MaterialLine>,
    pub materials_total: BigDecimal,
    pub transportation: BigDecimal,
    pub admin: BigDecimal,
    pub grand_total: BigDecimal,
}

/// Validates a material and rewrites `total_cost` from quantity and unit cost.
/// Whatever total the caller sent is discarded.
pub fn recompute(material: &mut Material) -> Result<(), ServiceError> {
    if material.name.trim().is_empty() {
        return Err(ServiceError::Validation("Material name is required".to_string()));
    }
    let quantity = ensure_non_negative("quantity", material.quantity.clone())?;
    material.quantity = quantity.round(QUANTITY_SCALE);
    material.unit_cost = non_negative_amount("unit cost", material.unit_cost.clone())?;

    let total = &material.quantity * &material.unit_cost;
    material.total_cost = non_negative_amount("total cost", total)?;
    Ok(())
}

/// Prepares a full replacement list for storage. Ids must be unique.
pub fn normalize_all(mut materials: Vec<Material>) -> Result<Vec<Material>, ServiceError> {
    let mut seen = HashSet::new();
    for material in materials.iter_mut() {
        if !seen.insert(material.id) {
            return Err(ServiceError::Validation(format!(
                "Material {} appears more than once",
                material.id
            )));
        }
        recompute(material)?;
    }
    materials_sum(&materials)?;
    Ok(materials)
}

/// Sum of stored totals. Only call on lists that went through `normalize_all`.
pub fn materials_total(materials: &[Material]) -> BigDecimal {
    materials.iter().map(|m| &m.total_cost).sum()
}

fn materials_sum(materials: &[Material]) -> Result<BigDecimal, ServiceError> {
    ensure_non_negative("materials total", materials_total(materials))
}

pub fn compute_summary(
    materials: &[Material],
    transportation: BigDecimal,
    admin: BigDecimal,
) -> Result<MaterialsSummary, ServiceError> {
    let transportation = non_negative_amount("transportation", transportation)?;
    let admin = non_negative_amount("admin", admin)?;

    let per_item_totals: Vec<MaterialLine> = materials
        .iter()
        .map(|m| MaterialLine {
            id: m.id,
            name: m.name.clone(),
            total_cost: round_money(&(&m.quantity * &m.unit_cost)),
        })
        .collect();

    let materials_total = ensure_non_negative(
        "materials total",
        per_item_totals.iter().map(|line| &line.total_cost).sum(),
    )?;
    let grand_total = ensure_non_negative("grand total", &materials_total + &transportation + &admin)?;

    Ok(MaterialsSummary {
        per_item_totals,
        materials_total,
        transportation,
        admin,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn material(name: &str, quantity: &str, unit_cost: &str) -> Material {
        Material {
            id: Uuid::new_v4(),
            name: name.to_string(),
            quantity: dec(quantity),
            unit: "bag".to_string(),
            unit_cost: dec(unit_cost),
            total_cost: BigDecimal::zero(),
            supplier: None,
            purchase_date: None,
        }
    }

    #[test]
    fn cement_scenario() {
        let materials = normalize_all(vec![material("Cement", "10", "350")]).unwrap();
        assert_eq!(materials[0].total_cost, dec("3500"));

        let summary = compute_summary(&materials, dec("500"), dec("200")).unwrap();
        assert_eq!(summary.materials_total, dec("3500"));
        assert_eq!(summary.grand_total, dec("4200"));
        assert_eq!(summary.per_item_totals.len(), 1);
        assert_eq!(summary.per_item_totals[0].total_cost, dec("3500"));
    }

    #[test]
    fn caller_supplied_total_is_ignored() {
        let mut cement = material("Cement", "4", "25");
        cement.total_cost = dec("1000000");
        recompute(&mut cement).unwrap();
        assert_eq!(cement.total_cost, dec("100"));
    }

    #[test]
    fn recompute_is_idempotent() {
        let once = normalize_all(vec![material("Sand", "3", "120"), material("Rebar", "12", "80.5")]).unwrap();
        let twice = normalize_all(once.clone()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(materials_total(&twice), dec("1326"));
    }

    #[test]
    fn decimal_totals_are_exact() {
        let materials = normalize_all(vec![
            material("Nails", "0.1", "1"),
            material("Wire", "0.2", "1"),
        ])
        .unwrap();
        assert_eq!(materials_total(&materials), dec("0.3"));
    }

    #[test]
    fn rejects_negative_and_blank_input() {
        assert!(matches!(
            normalize_all(vec![material("Cement", "-1", "350")]),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            normalize_all(vec![material("Cement", "1", "-350")]),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            normalize_all(vec![material("  ", "1", "1")]),
            Err(ServiceError::Validation(_))
        ));
        assert!(compute_summary(&[], dec("-1"), dec("0")).is_err());
        assert!(compute_summary(&[], dec("0"), dec("-1")).is_err());
    }

    #[test]
    fn oversized_totals_are_rejected_and_stored_lines_decode() {
        assert!(matches!(
            normalize_all(vec![material("Steel", "1e200", "1e200")]),
            Err(ServiceError::Validation(msg)) if msg.starts_with("quantity")
        ));
        assert!(matches!(
            normalize_all(vec![material("Steel", "1e14", "1e14")]),
            Err(ServiceError::Validation(msg)) if msg.starts_with("total cost")
        ));
        assert!(normalize_all(vec![material("Steel", "100000000", "100000000")]).is_err());

        // each line fits, the sums do not
        let half = || material("Steel", "1", "600000000000000");
        assert!(matches!(
            normalize_all(vec![half(), half()]),
            Err(ServiceError::Validation(msg)) if msg.starts_with("materials total")
        ));
        let one = normalize_all(vec![half()]).unwrap();
        assert!(matches!(
            compute_summary(&one, dec("400000000000000"), BigDecimal::zero()),
            Err(ServiceError::Validation(msg)) if msg.starts_with("grand total")
        ));

        let big = normalize_all(vec![material("Steel", "1000", "999999999")]).unwrap();
        let stored = serde_json::to_string(&big).unwrap();
        let decoded: Vec<Material> = serde_json::from_str(&stored).unwrap();
        assert_eq!(decoded, big);
        assert_eq!(decoded[0].total_cost, dec("999999999000"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let cement = material("Cement", "1", "10");
        let mut copy = material("Cement again", "2", "10");
        copy.id = cement.id;
        assert!(matches!(
            normalize_all(vec![cement, copy]),
            Err(ServiceError::Validation(msg)) if msg.contains("more than once")
        ));
    }

    #[test]
    fn empty_ledger_summary() {
        let summary = compute_summary(&[], BigDecimal::zero(), BigDecimal::zero()).unwrap();
        assert!(summary.materials_total.is_zero());
        assert!(summary.grand_total.is_zero());
        assert!(summary.per_item_totals.is_empty());
    }
}
