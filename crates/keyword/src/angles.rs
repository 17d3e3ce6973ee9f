//! Content-angle catalog and keyword rewriting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::KeywordError;

/// Penalty attached to every forced angle change.
pub const NOVELTY_PENALTY: f64 = 0.2;

/// Dimension along which a keyword can be re-angled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleAxis {
    PriceSegment,
    UseCase,
    BrandFocus,
    Regional,
    Installation,
    Comparison,
    Seasonal,
    UserType,
}

/// One catalog entry: a keyword prefix and/or suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AngleVariation {
    pub axis: AngleAxis,
    pub modifier_id: &'static str,
    pub prefix: Option<&'static str>,
    pub suffix: Option<&'static str>,
    pub description: &'static str,
}

const fn pre(
    axis: AngleAxis,
    modifier_id: &'static str,
    prefix: &'static str,
    description: &'static str,
) -> AngleVariation {
    AngleVariation {
        axis,
        modifier_id,
        prefix: Some(prefix),
        suffix: None,
        description,
    }
}

const fn suf(
    axis: AngleAxis,
    modifier_id: &'static str,
    suffix: &'static str,
    description: &'static str,
) -> AngleVariation {
    AngleVariation {
        axis,
        modifier_id,
        prefix: None,
        suffix: Some(suffix),
        description,
    }
}

use self::AngleAxis::*;

const PRICE_SEGMENT: &[AngleVariation] = &[
    pre(PriceSegment, "budget", "cheap ", "Budget-friendly options under $50"),
    suf(PriceSegment, "mid_range", " under 150", "Mid-range options $50-$150"),
    pre(PriceSegment, "premium", "premium ", "Premium options over $150"),
    pre(PriceSegment, "value", "best value ", "Best value for money options"),
    pre(PriceSegment, "luxury", "luxury ", "High-end luxury options"),
];

const USE_CASE: &[AngleVariation] = &[
    suf(UseCase, "apartment", " for apartments", "Perfect for apartment living"),
    suf(UseCase, "family", " for families", "Family-friendly solutions"),
    suf(UseCase, "elderly", " for seniors", "Senior-friendly easy setup"),
    pre(UseCase, "tech_enthusiast", "advanced ", "Advanced features for tech lovers"),
    suf(UseCase, "pet_owners", " for pet owners", "Solutions for pet owners"),
    pre(UseCase, "energy_saving", "energy efficient ", "Energy efficiency focused"),
    pre(UseCase, "security", "security ", "Security-focused applications"),
    suf(UseCase, "convenience", " with convenience", "Maximum convenience features"),
];

const BRAND_FOCUS: &[AngleVariation] = &[
    pre(BrandFocus, "amazon", "amazon ", "Amazon ecosystem integration"),
    pre(BrandFocus, "google", "google ", "Google Assistant compatible"),
    pre(BrandFocus, "apple", "apple homekit ", "Apple HomeKit integration"),
    pre(BrandFocus, "generic", "universal ", "Brand-agnostic universal solutions"),
    pre(BrandFocus, "multi_brand", "compatible ", "Multi-platform compatibility"),
];

const REGIONAL: &[AngleVariation] = &[
    suf(Regional, "us", " usa", "US market availability and pricing"),
    suf(Regional, "uk", " uk", "UK specific models and pricing"),
    suf(Regional, "canada", " canada", "Canadian market options"),
    suf(Regional, "australia", " australia", "Australian compatibility"),
    pre(Regional, "international", "international ", "International shipping options"),
];

const INSTALLATION: &[AngleVariation] = &[
    pre(Installation, "diy", "diy ", "Easy DIY installation guide"),
    suf(Installation, "professional", " professional install", "Professional installation required"),
    pre(Installation, "no_tools", "easy setup ", "No tools required setup"),
    suf(Installation, "advanced", " advanced setup", "Advanced installation features"),
    pre(Installation, "rental", "rental friendly ", "Rental-friendly removable options"),
];

const COMPARISON: &[AngleVariation] = &[
    suf(Comparison, "vs_alternatives", " vs alternatives", "Compared to alternatives"),
    suf(Comparison, "pros_cons", " pros and cons", "Detailed pros and cons analysis"),
    suf(Comparison, "before_after", " before after", "Before and after comparison"),
    suf(Comparison, "upgrade", " upgrade guide", "Upgrade comparison guide"),
];

const SEASONAL: &[AngleVariation] = &[
    pre(Seasonal, "winter", "winter ", "Winter-specific considerations"),
    pre(Seasonal, "summer", "summer ", "Summer usage and benefits"),
    pre(Seasonal, "holiday", "holiday ", "Holiday season recommendations"),
    suf(Seasonal, "back_to_school", " back to school", "Back-to-school setup"),
    pre(Seasonal, "spring_cleaning", "spring ", "Spring cleaning and organization"),
];

const USER_TYPE: &[AngleVariation] = &[
    pre(UserType, "beginner", "beginner ", "Beginner-friendly guides"),
    pre(UserType, "expert", "expert ", "Expert-level analysis"),
    suf(UserType, "busy_professional", " for professionals", "For busy professionals"),
    pre(UserType, "student", "student ", "Student budget solutions"),
    suf(UserType, "homeowner", " for homeowners", "Homeowner long-term solutions"),
    pre(UserType, "renter", "renter ", "Renter-friendly options"),
];

impl AngleAxis {
    /// Declaration order; also the fallback preference order.
    pub const ALL: [AngleAxis; 8] = [
        PriceSegment,
        UseCase,
        BrandFocus,
        Regional,
        Installation,
        Comparison,
        Seasonal,
        UserType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PriceSegment => "price_segment",
            UseCase => "use_case",
            BrandFocus => "brand_focus",
            Regional => "regional",
            Installation => "installation",
            Comparison => "comparison",
            Seasonal => "seasonal",
            UserType => "user_type",
        }
    }

    pub fn variations(self) -> &'static [AngleVariation] {
        match self {
            PriceSegment => PRICE_SEGMENT,
            UseCase => USE_CASE,
            BrandFocus => BRAND_FOCUS,
            Regional => REGIONAL,
            Installation => INSTALLATION,
            Comparison => COMPARISON,
            Seasonal => SEASONAL,
            UserType => USER_TYPE,
        }
    }

    /// Axes that pair well with `self` when planning a content series.
    pub fn complementary_axes(self) -> &'static [AngleAxis] {
        match self {
            PriceSegment => &[UseCase, Comparison],
            UseCase => &[PriceSegment, Installation],
            BrandFocus => &[Comparison, UseCase],
            Installation => &[UserType, UseCase],
            Comparison => &[PriceSegment, UseCase],
            Seasonal => &[UseCase, PriceSegment],
            UserType => &[Installation, PriceSegment],
            Regional => &[UseCase],
        }
    }
}

impl fmt::Display for AngleAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AngleAxis {
    type Err = KeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AngleAxis::ALL
            .into_iter()
            .find(|axis| axis.as_str() == s.trim())
            .ok_or_else(|| KeywordError::UnknownAxis(s.to_string()))
    }
}

/// `prefix + keyword + suffix` with whitespace collapsed.
pub fn apply_variation(keyword: &str, variation: &AngleVariation) -> String {
    let combined = format!(
        "{}{}{}",
        variation.prefix.unwrap_or(""),
        keyword.trim(),
        variation.suffix.unwrap_or("")
    );
    combined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A keyword rewritten along one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleChange {
    pub original_keyword: String,
    pub new_keyword: String,
    pub axis: AngleAxis,
    pub modifier: String,
    pub description: String,
    pub reason: String,
    pub novelty_penalty: f64,
}

/// Catalog entry for `keyword` on `axis`, chosen by keyword hash so the same
/// keyword always gets the same modifier.
fn pick_variation(keyword: &str, axis: AngleAxis) -> &'static AngleVariation {
    let variations = axis.variations();
    let idx = (xxh3_64(keyword.as_bytes()) % variations.len() as u64) as usize;
    &variations[idx]
}

fn change(keyword: &str, axis: AngleAxis, reason: String, penalty: f64) -> AngleChange {
    let variation = pick_variation(keyword, axis);
    AngleChange {
        original_keyword: keyword.to_string(),
        new_keyword: apply_variation(keyword, variation),
        axis,
        modifier: variation.modifier_id.to_string(),
        description: variation.description.to_string(),
        reason,
        novelty_penalty: penalty,
    }
}

/// Rewrite `keyword` along the first axis not used recently.
///
/// Candidates are `preferred` followed by the remaining axes in declaration
/// order. Axes named in `recent_angles` are skipped; when every axis has been
/// used the full list is used again.
pub fn force_angle_change(
    keyword: &str,
    recent_angles: &[String],
    preferred: &[AngleAxis],
) -> AngleChange {
    let mut candidates: Vec<AngleAxis> = Vec::with_capacity(AngleAxis::ALL.len());
    for axis in preferred.iter().copied().chain(AngleAxis::ALL) {
        if !candidates.contains(&axis) {
            candidates.push(axis);
        }
    }
    let fresh = candidates
        .iter()
        .copied()
        .find(|axis| !recent_angles.iter().any(|r| r == axis.as_str()));
    let axis = fresh.unwrap_or_else(|| {
        warn!(keyword, "all_angle_axes_recently_used");
        candidates[0]
    });

    let result = change(
        keyword,
        axis,
        format!("forced angle change to avoid similarity: {axis}"),
        NOVELTY_PENALTY,
    );
    info!(
        original = keyword,
        rewritten = %result.new_keyword,
        axis = %axis,
        "angle_changed"
    );
    result
}

/// Up to `max` rewrites of `keyword`, one per axis in declaration order.
pub fn generate_variations(keyword: &str, max: usize) -> Vec<AngleChange> {
    AngleAxis::ALL
        .into_iter()
        .take(max)
        .map(|axis| {
            change(
                keyword,
                axis,
                format!("applied {axis} angle"),
                0.0,
            )
        })
        .collect()
}

/// One rewrite plus the axes worth covering next in the same series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleSuggestion {
    #[serde(flatten)]
    pub change: AngleChange,
    pub pairs_with: Vec<AngleAxis>,
}

/// [`generate_variations`] annotated with [`AngleAxis::complementary_axes`].
pub fn suggest_angles(keyword: &str, max: usize) -> Vec<AngleSuggestion> {
    generate_variations(keyword, max)
        .into_iter()
        .map(|change| AngleSuggestion {
            pairs_with: change.axis.complementary_axes().to_vec(),
            change,
        })
        .collect()
}

/// Size of the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AngleCatalogStats {
    pub axis_count: usize,
    pub variation_count: usize,
}

pub fn catalog_statistics() -> AngleCatalogStats {
    AngleCatalogStats {
        axis_count: AngleAxis::ALL.len(),
        variation_count: AngleAxis::ALL.iter().map(|a| a.variations().len()).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_shape() {
        let stats = catalog_statistics();
        assert_eq!(stats.axis_count, 8);
        assert_eq!(stats.variation_count, 5 + 8 + 5 + 5 + 5 + 4 + 5 + 6);
        for axis in AngleAxis::ALL {
            for v in axis.variations() {
                assert_eq!(v.axis, axis);
                assert!(v.prefix.is_some() ^ v.suffix.is_some());
            }
        }
    }

    #[test]
    fn variation_application_collapses_whitespace() {
        let budget = &PRICE_SEGMENT[0];
        assert_eq!(apply_variation("  smart   plug ", budget), "cheap smart plug");
        let apartments = &USE_CASE[0];
        assert_eq!(apply_variation("smart plug", apartments), "smart plug for apartments");
    }

    #[test]
    fn forced_change_skips_recent_axes() {
        let recent = vec!["price_segment".to_string(), "general".to_string()];
        let change = force_angle_change("smart plug", &recent, &[]);
        assert_eq!(change.axis, UseCase);
        assert_eq!(change.novelty_penalty, NOVELTY_PENALTY);
        assert_ne!(change.new_keyword, "smart plug");
        assert!(USE_CASE.iter().any(|v| v.modifier_id == change.modifier));
    }

    #[test]
    fn preferred_axes_come_first() {
        let change = force_angle_change("smart plug", &[], &[Seasonal, Regional]);
        assert_eq!(change.axis, Seasonal);
        let recent = vec!["seasonal".to_string()];
        let change = force_angle_change("smart plug", &recent, &[Seasonal, Regional]);
        assert_eq!(change.axis, Regional);
    }

    #[test]
    fn exhausted_axes_fall_back_to_first_candidate() {
        let recent: Vec<String> = AngleAxis::ALL.iter().map(|a| a.to_string()).collect();
        assert_eq!(force_angle_change("kw", &recent, &[]).axis, PriceSegment);
        assert_eq!(force_angle_change("kw", &recent, &[UserType]).axis, UserType);
    }

    #[test]
    fn modifier_choice_is_deterministic() {
        let a = force_angle_change("robot vacuum", &[], &[]);
        let b = force_angle_change("robot vacuum", &[], &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn generated_variations_cover_axes_in_order() {
        let variations = generate_variations("smart plug", 3);
        let axes: Vec<_> = variations.iter().map(|v| v.axis).collect();
        assert_eq!(axes, vec![PriceSegment, UseCase, BrandFocus]);
        assert_eq!(generate_variations("smart plug", 20).len(), 8);
    }

    #[test]
    fn axis_parsing_and_complements() {
        assert_eq!("use_case".parse::<AngleAxis>().unwrap(), UseCase);
        assert!("general".parse::<AngleAxis>().is_err());
        assert_eq!(Regional.complementary_axes(), &[UseCase]);
        assert_eq!(PriceSegment.complementary_axes(), &[UseCase, Comparison]);
    }

    #[test]
    fn suggestions_name_the_axes_to_cover_next() {
        let suggestions = suggest_angles("smart plug", 2);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].change.axis, PriceSegment);
        assert_eq!(suggestions[0].pairs_with, vec![UseCase, Comparison]);
        assert_eq!(suggestions[1].pairs_with, vec![PriceSegment, Installation]);
        assert_eq!(suggestions[0].change, generate_variations("smart plug", 1)[0]);
    }
}
