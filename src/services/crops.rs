//! Baseline daily water requirement per crop, in litres per acre per day.
//!
//! Single table for the whole service. Figures are the Indian field averages
//! the irrigation simulator has always shipped with; they are indicative and
//! vary with soil, region and season.

/// Used for any crop not listed below.
pub const DEFAULT_WATER_REQUIREMENT: f64 = 18000.0;

pub const CROP_WATER_REQUIREMENTS: &[(&str, f64)] = &[
    // cereals
    ("rice", 45987.0),
    ("wheat", 15176.0),
    ("maize", 18395.0),
    ("sorghum", 19271.0),
    ("millet", 17986.0),
    ("barley", 14000.0),
    // cash crops
    ("sugarcane", 24731.0),
    ("cotton", 17986.0),
    ("jute", 20000.0),
    ("tobacco", 21000.0),
    // pulses
    ("pulses", 16187.0),
    ("gram", 12000.0),
    ("lentil", 12500.0),
    ("pigeonpea", 15000.0),
    ("mungbean", 14000.0),
    // oilseeds
    ("groundnut", 19656.0),
    ("soybean", 15176.0),
    ("mustard", 11803.0),
    ("sunflower", 13490.0),
    ("sesame", 13000.0),
    ("castor", 16000.0),
    // vegetables
    ("vegetables", 17986.0),
    ("potato", 22483.0),
    ("onion", 20000.0),
    ("tomato", 18000.0),
    ("cabbage", 16000.0),
    ("cauliflower", 16500.0),
    ("brinjal", 17000.0),
    ("okra", 15000.0),
    // fruit
    ("banana", 25000.0),
    ("mango", 12000.0),
    ("citrus", 15000.0),
    ("papaya", 20000.0),
    ("pomegranate", 14000.0),
    ("apple", 10000.0),
    ("grapes", 18000.0),
    ("guava", 12000.0),
    // plantation
    ("tea", 20000.0),
    ("coffee", 17000.0),
    ("coconut", 25000.0),
    ("arecanut", 22000.0),
];

pub fn normalize(crop: &str) -> String {
    crop.trim().to_lowercase()
}

/// Case-insensitive lookup; unknown names get [`DEFAULT_WATER_REQUIREMENT`].
pub fn water_requirement(crop: &str) -> f64 {
    let key = normalize(crop);
    CROP_WATER_REQUIREMENTS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, litres)| *litres)
        .unwrap_or(DEFAULT_WATER_REQUIREMENT)
}
