use duty_engine::core::currency::CurrencyCode;
use duty_engine::duty::engine::{DutyEngine, VAT_RATE};
use duty_engine::duty::inputs::{DutyInputs, DutyMode};
use duty_engine::error::{ChargeError, DutyError};
use duty_engine::quotation::charges::{ChargeList, ChargeUpdate};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Money with two decimals, 0 to 10,000,000.00.
fn arb_money() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Percentage rate with one decimal, 0 to 100.0.
fn arb_percent() -> impl Strategy<Value = Decimal> {
    (0i64..=1000i64).prop_map(|tenths| Decimal::new(tenths, 1))
}

/// Exchange rate with two decimals, 0.01 to 5,000.00.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (1i64..=500_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_mode() -> impl Strategy<Value = DutyMode> {
    prop::sample::select(DutyMode::ALL.to_vec())
}

fn arb_inputs() -> impl Strategy<Value = DutyInputs> {
    (
        arb_money(),
        arb_money(),
        arb_rate(),
        arb_percent(),
        arb_percent(),
        prop::option::of(arb_money()),
        arb_mode(),
    )
        .prop_map(|(invoice, freight, rate, duty, levy, insurance, mode)| {
            let inputs = DutyInputs::new(invoice, freight, CurrencyCode::new("USD"), rate)
                .with_duty_rate(duty)
                .with_levy_rate(levy)
                .with_mode(mode);
            match insurance {
                Some(i) => inputs.with_insurance(i),
                None => inputs,
            }
        })
}

/// One edit against a charge list; indices are taken modulo the current length.
#[derive(Debug, Clone)]
enum Edit {
    Add,
    Push(Decimal, Decimal),
    SetQuantity(usize, Decimal),
    SetPrice(usize, Decimal),
    Remove(usize),
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    let qty = (0i64..100i64).prop_map(Decimal::from);
    prop_oneof![
        Just(Edit::Add),
        (qty.clone(), arb_money()).prop_map(|(q, p)| Edit::Push(q, p)),
        (any::<usize>(), qty).prop_map(|(i, q)| Edit::SetQuantity(i, q)),
        (any::<usize>(), arb_money()).prop_map(|(i, p)| Edit::SetPrice(i, p)),
        any::<usize>().prop_map(Edit::Remove),
    ]
}

proptest! {
    // Identical inputs always produce an identical breakdown.
    #[test]
    fn compute_is_deterministic(inputs in arb_inputs()) {
        let a = DutyEngine::compute(&inputs).unwrap();
        let b = DutyEngine::compute(&inputs).unwrap();
        prop_assert_eq!(a, b);
    }

    // VAT is 7.5% of CIF plus every derived charge.
    #[test]
    fn vat_base_includes_all_charges(inputs in arb_inputs()) {
        let b = DutyEngine::compute(&inputs).unwrap();
        let base = b.cif + b.fcs + b.surcharge + b.etls + b.duty + b.levy;
        prop_assert_eq!(b.vat_base, base);
        prop_assert_eq!(b.vat, base * VAT_RATE);
    }

    // WITH_VAT = NO_VAT + VAT, and NO_VAT is the sum of the non-VAT charges.
    #[test]
    fn mode_totals_relate(inputs in arb_inputs()) {
        let b = DutyEngine::compute(&inputs).unwrap();
        let no_vat = b.fcs + b.surcharge + b.etls + b.duty + b.levy;
        prop_assert_eq!(b.total_for(DutyMode::NoVat), no_vat);
        prop_assert_eq!(b.total_for(DutyMode::WithVat), no_vat + b.vat);
        prop_assert_eq!(b.total, b.total_for(inputs.mode()));
    }

    // IDEC ignores duty and levy rates entirely.
    #[test]
    fn idec_is_fcs_plus_etls(inputs in arb_inputs(), duty in arb_percent(), levy in arb_percent()) {
        let a = DutyEngine::compute(&inputs.clone().with_mode(DutyMode::Idec)).unwrap();
        let b = DutyEngine::compute(
            &inputs.with_mode(DutyMode::Idec).with_duty_rate(duty).with_levy_rate(levy),
        )
        .unwrap();
        prop_assert_eq!(a.total, a.fcs + a.etls);
        prop_assert_eq!(a.total, b.total);
    }

    // Negative money or a non-positive rate never yields a breakdown.
    #[test]
    fn invalid_inputs_rejected(
        inputs in arb_inputs(),
        negative in (1i64..1_000_000i64).prop_map(|c| Decimal::new(-c, 2)),
    ) {
        let neg_invoice = DutyInputs::new(
            negative,
            inputs.freight_amount(),
            inputs.currency().clone(),
            inputs.exchange_rate(),
        );
        let is_negative = |r: Result<_, DutyError>| matches!(r, Err(DutyError::Negative { .. }));
        prop_assert!(is_negative(DutyEngine::compute(&neg_invoice)));
        prop_assert!(is_negative(DutyEngine::compute(&inputs.clone().with_duty_rate(negative))));
        prop_assert!(matches!(
            DutyEngine::compute(&inputs.clone().with_exchange_rate(Decimal::ZERO)),
            Err(DutyError::NonPositiveExchangeRate(_))
        ));
        prop_assert!(matches!(
            DutyEngine::compute(&inputs.with_exchange_rate(negative)),
            Err(DutyError::NonPositiveExchangeRate(_))
        ));
    }

    // Grand total tracks every edit sequence, and the list never empties.
    #[test]
    fn grand_total_matches_lines(edits in prop::collection::vec(arb_edit(), 0..40)) {
        let mut list = ChargeList::new();
        for edit in edits {
            let ids: Vec<_> = list.lines().iter().map(|l| l.id()).collect();
            let pick = |i: usize| ids[i % ids.len()];
            match edit {
                Edit::Add => {
                    list.add_line("added");
                }
                Edit::Push(q, p) => {
                    list.push_line("pushed", q, p).unwrap();
                }
                Edit::SetQuantity(i, q) => {
                    list.update_line(pick(i), ChargeUpdate::Quantity(q)).unwrap();
                }
                Edit::SetPrice(i, p) => {
                    list.update_line(pick(i), ChargeUpdate::UnitPrice(p)).unwrap();
                }
                Edit::Remove(i) => {
                    let before = list.len();
                    match list.remove_line(pick(i)) {
                        Ok(_) => {
                            prop_assert_eq!(list.len(), before - 1);
                        }
                        Err(e) => {
                            prop_assert_eq!(e, ChargeError::LastLine);
                            prop_assert_eq!(list.len(), 1);
                        }
                    }
                }
            }
            prop_assert!(list.len() >= 1);
        }

        let expected: Decimal = list
            .lines()
            .iter()
            .map(|l| l.quantity() * l.unit_price())
            .sum();
        prop_assert_eq!(list.grand_total(), expected);
    }
}
