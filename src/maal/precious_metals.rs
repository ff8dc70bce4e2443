//! # Fiqh Compliance: Gold & Silver
//!
//! - Gold is valued on its pure (24K) content: `grams × karat / 24 × price`.
//! - Silver is assumed refined and valued at `grams × price`.
//! - Personal-use jewelry is zakatable under Hanafi fiqh and exempt under the
//!   other schools; metal held for investment is zakatable under every school.
//!
//! Declarations arrive in one of several historical shapes
//! ([`MetalDeclaration`]) and are normalized into per-bucket
//! [`MetalHoldings`] before valuation.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

use crate::inputs::{IntoZakatDecimal, floor_zero, normalize};
use crate::traits::{ValuationContext, ZakatableCategory};
use crate::types::CalculationStep;

/// Karat of pure gold.
pub const PURE_KARAT: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Metal {
    Gold,
    Silver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum MetalUsage {
    /// Held for trade or saving; always zakatable.
    #[default]
    Investment,
    /// Worn as jewelry; exempt outside Hanafi fiqh.
    PersonalUse,
}

/// One canonical bucket of metal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetalItem {
    pub metal: Metal,
    pub grams: Decimal,
    /// Ignored for silver.
    #[serde(default, deserialize_with = "lenient_karat")]
    pub karat: u32,
    pub usage: MetalUsage,
}

impl MetalItem {
    pub fn gold(grams: impl IntoZakatDecimal, karat: u32, usage: MetalUsage) -> Self {
        Self {
            metal: Metal::Gold,
            grams: normalize(grams),
            karat,
            usage,
        }
    }

    pub fn silver(grams: impl IntoZakatDecimal, usage: MetalUsage) -> Self {
        Self {
            metal: Metal::Silver,
            grams: normalize(grams),
            karat: PURE_KARAT,
            usage,
        }
    }

    /// Karat clamped to `1..=24`; 0 or anything above 24 reads as pure gold.
    pub fn effective_karat(&self) -> u32 {
        match self.karat {
            k @ 1..=PURE_KARAT => k,
            _ => PURE_KARAT,
        }
    }

    /// Market value of the bucket, before any exemption.
    pub fn market_value(&self, gold_per_gram: Decimal, silver_per_gram: Decimal) -> Decimal {
        let grams = floor_zero(self.grams);
        match self.metal {
            Metal::Gold => {
                grams
                    .saturating_mul(gold_per_gram)
                    .saturating_mul(Decimal::from(self.effective_karat()))
                    / Decimal::from(PURE_KARAT)
            }
            Metal::Silver => grams.saturating_mul(silver_per_gram),
        }
    }
}

/// Reads a karat the way other declared numbers are read: malformed or
/// negative values become 0, which values as pure gold.
fn lenient_karat<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let karat = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => normalize(n.to_string()),
        serde_json::Value::String(s) => normalize(s),
        _ => Decimal::ZERO,
    };
    Ok(karat.trunc().to_u32().unwrap_or(0))
}

/// A gold line item as entered in itemized forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KaratItem {
    #[serde(default, deserialize_with = "lenient_karat")]
    pub karat: u32,
    pub grams: Decimal,
}

/// The shapes in which precious metals can be declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", tag = "shape")]
pub enum MetalDeclaration {
    /// Explicit personal/investment split per metal. Canonical.
    #[serde(rename_all = "camelCase")]
    Split {
        #[serde(default)]
        gold_personal_grams: Decimal,
        #[serde(default)]
        gold_investment_grams: Decimal,
        #[serde(default)]
        silver_personal_grams: Decimal,
        #[serde(default)]
        silver_investment_grams: Decimal,
    },
    /// Karat-itemized gold plus silver, with one jewelry flag for both.
    #[serde(rename_all = "camelCase")]
    Itemized {
        #[serde(default)]
        gold_items: Vec<KaratItem>,
        #[serde(default)]
        silver_grams: Decimal,
        #[serde(default)]
        worn_as_jewelry: bool,
    },
    /// One weight per metal and one jewelry flag.
    #[serde(rename_all = "camelCase")]
    Single {
        #[serde(default)]
        gold_grams: Decimal,
        #[serde(default)]
        silver_grams: Decimal,
        #[serde(default)]
        worn_as_jewelry: bool,
    },
    /// Already-normalized buckets.
    Buckets { items: Vec<MetalItem> },
}

impl Default for MetalDeclaration {
    fn default() -> Self {
        MetalDeclaration::Buckets { items: Vec::new() }
    }
}

impl MetalDeclaration {
    /// Normalizes any declared shape into canonical buckets.
    ///
    /// Zero-weight buckets are dropped.
    pub fn canonical(&self) -> MetalHoldings {
        let flagged = |jewelry: bool| {
            if jewelry { MetalUsage::PersonalUse } else { MetalUsage::Investment }
        };
        let items = match self {
            MetalDeclaration::Split {
                gold_personal_grams,
                gold_investment_grams,
                silver_personal_grams,
                silver_investment_grams,
            } => vec![
                MetalItem::gold(*gold_personal_grams, PURE_KARAT, MetalUsage::PersonalUse),
                MetalItem::gold(*gold_investment_grams, PURE_KARAT, MetalUsage::Investment),
                MetalItem::silver(*silver_personal_grams, MetalUsage::PersonalUse),
                MetalItem::silver(*silver_investment_grams, MetalUsage::Investment),
            ],
            MetalDeclaration::Itemized {
                gold_items,
                silver_grams,
                worn_as_jewelry,
            } => gold_items
                .iter()
                .map(|item| MetalItem::gold(item.grams, item.karat, flagged(*worn_as_jewelry)))
                .chain(std::iter::once(MetalItem::silver(*silver_grams, flagged(*worn_as_jewelry))))
                .collect(),
            MetalDeclaration::Single {
                gold_grams,
                silver_grams,
                worn_as_jewelry,
            } => vec![
                MetalItem::gold(*gold_grams, PURE_KARAT, flagged(*worn_as_jewelry)),
                MetalItem::silver(*silver_grams, flagged(*worn_as_jewelry)),
            ],
            MetalDeclaration::Buckets { items } => items
                .iter()
                .cloned()
                .map(|mut item| {
                    item.grams = normalize(item.grams);
                    item
                })
                .collect(),
        };
        MetalHoldings {
            items: items.into_iter().filter(|item| item.grams > Decimal::ZERO).collect(),
        }
    }
}

impl From<MetalHoldings> for MetalDeclaration {
    fn from(holdings: MetalHoldings) -> Self {
        MetalDeclaration::Buckets { items: holdings.items }
    }
}

/// Canonical metal holdings: one entry per `{metal, karat, usage}` bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetalHoldings {
    pub items: Vec<MetalItem>,
}

impl MetalHoldings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, item: MetalItem) -> Self {
        self.items.push(item);
        self
    }

    /// Raw and post-exemption values of the holdings.
    pub fn valuation(&self, ctx: &ValuationContext<'_>) -> MetalValuation {
        let exempt_personal = ctx.fiqh.is_jewelry_exempt();
        let mut valuation = MetalValuation::default();

        for item in &self.items {
            let value = item.market_value(ctx.rates.gold_per_gram, ctx.rates.silver_per_gram);
            let zakatable = if item.usage == MetalUsage::PersonalUse && exempt_personal {
                Decimal::ZERO
            } else {
                value
            };
            match item.metal {
                Metal::Gold => {
                    valuation.raw_gold = valuation.raw_gold.saturating_add(value);
                    valuation.zakatable_gold = valuation.zakatable_gold.saturating_add(zakatable);
                }
                Metal::Silver => {
                    valuation.raw_silver = valuation.raw_silver.saturating_add(value);
                    valuation.zakatable_silver = valuation.zakatable_silver.saturating_add(zakatable);
                }
            }
        }
        valuation
    }
}

/// Output of the metal valuation.
///
/// Raw values drive the nisab choice; zakatable values enter the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetalValuation {
    pub raw_gold: Decimal,
    pub raw_silver: Decimal,
    pub zakatable_gold: Decimal,
    pub zakatable_silver: Decimal,
}

impl MetalValuation {
    pub fn zakatable_total(&self) -> Decimal {
        self.zakatable_gold.saturating_add(self.zakatable_silver)
    }

    pub fn raw_total(&self) -> Decimal {
        self.raw_gold.saturating_add(self.raw_silver)
    }
}

impl ZakatableCategory for MetalHoldings {
    fn gross_value(&self, ctx: &ValuationContext<'_>) -> Decimal {
        self.valuation(ctx).raw_total()
    }

    fn zakatable_value(&self, ctx: &ValuationContext<'_>) -> Decimal {
        self.valuation(ctx).zakatable_total()
    }

    fn trace_steps(&self, ctx: &ValuationContext<'_>) -> Vec<CalculationStep> {
        let exempt_personal = ctx.fiqh.is_jewelry_exempt();
        let mut trace = Vec::new();
        for item in &self.items {
            let usage = match item.usage {
                MetalUsage::PersonalUse => "personal",
                MetalUsage::Investment => "investment",
            };
            let label = match item.metal {
                Metal::Gold => format!("Gold {}K, {} ({}g)", item.effective_karat(), usage, item.grams),
                Metal::Silver => format!("Silver, {} ({}g)", usage, item.grams),
            };
            let value = item.market_value(ctx.rates.gold_per_gram, ctx.rates.silver_per_gram);
            if item.usage == MetalUsage::PersonalUse && exempt_personal {
                trace.push(CalculationStep::info(format!(
                    "{} worth {:.2} is exempt personal jewelry under {} fiqh",
                    label,
                    value,
                    ctx.fiqh.title()
                )));
            } else {
                trace.push(CalculationStep::add(label, value));
            }
        }
        trace
    }
}
