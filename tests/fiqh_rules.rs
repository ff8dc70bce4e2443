use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strum::IntoEnumIterator;
use zakat_engine::prelude::*;

fn rates() -> MarketRates {
    MarketRates::new(6000, 80)
}

fn personal_gold(grams: i64) -> AssetDeclaration {
    AssetDeclaration::new().metals(MetalHoldings::new().with(MetalItem::gold(grams, 24, MetalUsage::PersonalUse)))
}

#[test]
fn test_personal_gold_hanafi_vs_maliki() {
    let assets = personal_gold(50);
    let none = LiabilityDeclaration::new();

    let hanafi = compute(FiqhSchool::Hanafi, &assets, &none, &rates());
    assert_eq!(hanafi.metals.zakatable_gold, dec!(50) * dec!(6000));

    let maliki = compute(FiqhSchool::Maliki, &assets, &none, &rates());
    assert_eq!(maliki.metals.zakatable_gold, Decimal::ZERO);
    assert_eq!(maliki.metals.raw_gold, dec!(300000));
}

#[test]
fn test_investment_metal_is_zakatable_under_every_school() {
    let assets = AssetDeclaration::new().metals(
        MetalHoldings::new()
            .with(MetalItem::gold(10, 24, MetalUsage::Investment))
            .with(MetalItem::silver(100, MetalUsage::Investment)),
    );
    for fiqh in FiqhSchool::iter() {
        let result = compute(fiqh, &assets, &LiabilityDeclaration::new(), &rates());
        assert_eq!(result.metals.zakatable_total(), dec!(68000), "{fiqh}");
    }
}

#[test]
fn test_mixed_personal_and_investment_buckets() {
    let assets = AssetDeclaration::new().metals(MetalDeclaration::Split {
        gold_personal_grams: dec!(20),
        gold_investment_grams: dec!(5),
        silver_personal_grams: dec!(100),
        silver_investment_grams: dec!(50),
    });
    let shafii = compute(FiqhSchool::Shafii, &assets, &LiabilityDeclaration::new(), &rates());
    assert_eq!(shafii.metals.zakatable_gold, dec!(30000));
    assert_eq!(shafii.metals.zakatable_silver, dec!(4000));

    let hanafi = compute(FiqhSchool::Hanafi, &assets, &LiabilityDeclaration::new(), &rates());
    assert_eq!(hanafi.metals.zakatable_gold, dec!(150000));
    assert_eq!(hanafi.metals.zakatable_silver, dec!(12000));
}

#[test]
fn test_shafii_deducts_nothing() {
    let assets = AssetDeclaration::new().cash(LiquidCash::new().in_hand(100_000));
    let liabilities = LiabilityDeclaration::new().debts(40_000).expenses(10_000);
    let result = compute(FiqhSchool::Shafii, &assets, &liabilities, &rates());
    assert_eq!(result.deductible_liabilities, Decimal::ZERO);
    assert_eq!(result.net_wealth, dec!(100000));
    assert_eq!(result.category_amount(AssetCategory::Liabilities), None);
}

#[test]
fn test_liability_deduction_per_school() {
    let assets = AssetDeclaration::new().cash(LiquidCash::new().in_hand(100_000));
    let liabilities = LiabilityDeclaration::new().debts(40_000).expenses(10_000);

    let expected = [
        (FiqhSchool::Hanafi, dec!(50000)),
        (FiqhSchool::Shafii, dec!(0)),
        (FiqhSchool::Maliki, dec!(40000)),
        (FiqhSchool::Hanbali, dec!(40000)),
        (FiqhSchool::Unspecified, dec!(40000)),
    ];
    for (fiqh, deductible) in expected {
        let result = compute(fiqh, &assets, &liabilities, &rates());
        assert_eq!(result.deductible_liabilities, deductible, "{fiqh}");
        assert_eq!(result.net_wealth, dec!(100000) - deductible, "{fiqh}");
    }
}

#[test]
fn test_liabilities_line_is_negative_and_last() {
    let assets = AssetDeclaration::new()
        .cash(LiquidCash::new().in_hand(100_000))
        .investments(InvestmentAssets::new().stocks(20_000));
    let liabilities = LiabilityDeclaration::new().debts(5_000);
    let result = compute(FiqhSchool::Hanbali, &assets, &liabilities, &rates());

    let last = result.breakdown.last().unwrap();
    assert_eq!(last.category, AssetCategory::Liabilities);
    assert_eq!(last.label, "Deductible Liabilities");
    assert_eq!(last.amount, dec!(-5000));
}

#[test]
fn test_nisab_weights_follow_school() {
    let assets = AssetDeclaration::new().cash(LiquidCash::new().in_hand(1));
    let hanafi = compute(FiqhSchool::Hanafi, &assets, &LiabilityDeclaration::new(), &rates());
    let maliki = compute(FiqhSchool::Maliki, &assets, &LiabilityDeclaration::new(), &rates());

    assert_eq!(hanafi.nisab.silver_standard, dec!(48988.80));
    assert_eq!(hanafi.nisab.gold_standard, dec!(524880));
    assert_eq!(maliki.nisab.silver_standard, dec!(47600));
    assert_eq!(maliki.nisab.gold_standard, dec!(510000));
}

#[test]
fn test_intent_weighted_policy() {
    let assets = AssetDeclaration::new().investments(
        InvestmentAssets::new()
            .stocks(100_000)
            .strategy(StockStrategy::Passive)
            .crypto(10_000)
            .pension(40_000, PensionAccess::Locked),
    );
    let result = compute_with_policy(
        FiqhSchool::Hanafi,
        &assets,
        &LiabilityDeclaration::new(),
        &rates(),
        &InvestmentPolicy::intent_weighted(),
    );
    assert_eq!(result.category_amount(AssetCategory::Investments), Some(dec!(35000)));

    let canonical = compute(FiqhSchool::Hanafi, &assets, &LiabilityDeclaration::new(), &rates());
    assert_eq!(canonical.category_amount(AssetCategory::Investments), Some(dec!(150000)));
}
