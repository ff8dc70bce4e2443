use proptest::prelude::*;
use rust_decimal::Decimal;
use zakat_engine::prelude::*;

fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000, 0u32..3).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn fiqh() -> impl Strategy<Value = FiqhSchool> {
    prop_oneof![
        Just(FiqhSchool::Hanafi),
        Just(FiqhSchool::Shafii),
        Just(FiqhSchool::Maliki),
        Just(FiqhSchool::Hanbali),
        Just(FiqhSchool::Unspecified),
    ]
}

prop_compose! {
    fn declaration()(
        cash in amount(),
        gold_personal in 0i64..2_000,
        gold_investment in 0i64..2_000,
        silver in 0i64..20_000,
        inventory in amount(),
        stocks in amount(),
        jewelry in any::<bool>(),
    ) -> AssetDeclaration {
        let metals = MetalDeclaration::Split {
            gold_personal_grams: Decimal::from(gold_personal),
            gold_investment_grams: Decimal::from(gold_investment),
            silver_personal_grams: if jewelry { Decimal::from(silver) } else { Decimal::ZERO },
            silver_investment_grams: if jewelry { Decimal::ZERO } else { Decimal::from(silver) },
        };
        AssetDeclaration::new()
            .cash(LiquidCash::new().in_hand(cash))
            .metals(metals)
            .business(BusinessAssets::new().inventory(inventory))
            .investments(InvestmentAssets::new().stocks(stocks))
    }
}

prop_compose! {
    fn liabilities()(debts in amount(), expenses in amount()) -> LiabilityDeclaration {
        LiabilityDeclaration::new().debts(debts).expenses(expenses)
    }
}

fn rates() -> MarketRates {
    MarketRates::new(6000, 80)
}

proptest! {
    #[test]
    fn net_wealth_is_never_negative(fiqh in fiqh(), assets in declaration(), debts in liabilities()) {
        let result = compute(fiqh, &assets, &debts, &rates());
        prop_assert!(result.net_wealth >= Decimal::ZERO);
        prop_assert!(result.zakat_payable >= Decimal::ZERO);
        prop_assert!(result.zakat_payable <= result.net_wealth);
    }

    #[test]
    fn compute_is_idempotent(fiqh in fiqh(), assets in declaration(), debts in liabilities()) {
        let first = compute(fiqh, &assets, &debts, &rates());
        let second = compute(fiqh, &assets, &debts, &rates());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn shafii_never_deducts(assets in declaration(), debts in liabilities()) {
        let result = compute(FiqhSchool::Shafii, &assets, &debts, &rates());
        prop_assert_eq!(result.deductible_liabilities, Decimal::ZERO);
    }

    #[test]
    fn payable_is_a_fortieth_when_eligible(fiqh in fiqh(), assets in declaration(), debts in liabilities()) {
        let result = compute(fiqh, &assets, &debts, &rates());
        prop_assert_eq!(
            result.is_eligible,
            result.net_wealth > Decimal::ZERO && result.net_wealth >= result.nisab.applicable
        );
        if result.is_eligible {
            prop_assert_eq!(result.zakat_payable, result.net_wealth * ZAKAT_RATE);
        } else {
            prop_assert_eq!(result.zakat_payable, Decimal::ZERO);
        }
    }

    #[test]
    fn breakdown_sums_to_net_before_floor(fiqh in fiqh(), assets in declaration(), debts in liabilities()) {
        let result = compute(fiqh, &assets, &debts, &rates());
        let total: Decimal = result.breakdown.iter().map(|line| line.amount).sum();
        prop_assert_eq!(total, result.zakatable_assets - result.deductible_liabilities);
    }

    #[test]
    fn normalize_never_negative_for_floats(value in any::<f64>()) {
        prop_assert!(normalize(value) >= Decimal::ZERO);
    }

    #[test]
    fn normalize_never_negative_for_text(text in ".*") {
        prop_assert!(normalize(text.as_str()) >= Decimal::ZERO);
    }
}
