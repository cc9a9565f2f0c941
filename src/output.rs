//! Colored console output for the slotpack CLI.
//!
//! Color scheme: blue+bold headers, cyan values, green success,
//! yellow warnings, dimmed secondary text.

use colored::Colorize;
use std::path::Path;

use crate::constants::WORD_BITS;
use crate::layout::{StorageField, StorageLayout};
use crate::schema::FeatureSet;

// ── Helpers ────────────────────────────────────────────────────────

/// Half-open bit range occupied by a field inside its home slot.
///
/// Multi-slot fields report their total width instead of a range.
pub fn format_bit_range(field: &StorageField) -> String {
    if field.is_out_of_band() {
        return "out-of-band".to_string();
    }
    if field.slots_consumed() > 1 {
        return format!("{} bits over {} slots", field.total_bits, field.slots_consumed());
    }
    let end = u64::from(field.offset) + field.total_bits;
    format!("[{}..{})", field.offset, end)
}

/// Share of occupied bits across all slots, in the range `[0.0, 1.0]`.
pub fn utilization(layout: &StorageLayout) -> f64 {
    if layout.slots() == 0 {
        return 0.0;
    }
    let used: u64 = layout.fields().iter().map(|f| f.total_bits).sum();
    used as f64 / (layout.slots() as f64 * f64::from(WORD_BITS))
}

fn format_features(features: &FeatureSet) -> String {
    if features.is_empty() {
        return "none".to_string();
    }
    features
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_type(field: &StorageField) -> String {
    match field.array_length() {
        0 => format!("{}[]", field.declaration.type_name),
        1 => field.declaration.type_name.clone(),
        n => format!("{}[{n}]", field.declaration.type_name),
    }
}

// ── Banner ─────────────────────────────────────────────────────────

/// Print the schema header.
pub fn print_banner(name: Option<&str>, schema_path: &Path, features: &FeatureSet) {
    println!();
    println!("{}", "=== slotpack storage layout ===".blue().bold());
    if let Some(name) = name {
        println!("  Contract:  {}", name.cyan());
    }
    println!("  Schema:    {}", schema_path.display().to_string().cyan());
    println!("  Features:  {}", format_features(features).cyan());
}

// ── Layout ─────────────────────────────────────────────────────────

/// Print every slot with the fields it holds, then the out-of-band fields.
pub fn print_layout(layout: &StorageLayout) {
    println!();
    println!("{}", "Slots:".blue().bold());
    for slot in layout.storage_slots() {
        println!("  {} {}", "slot".dimmed(), slot.index.to_string().cyan());
        for id in &slot.field_ids {
            let Ok(field) = layout.field_by_id(*id) else {
                continue;
            };
            let key = if field.is_reserved() {
                field.key().yellow()
            } else {
                field.key().normal()
            };
            println!(
                "    {:<24} {:<16} {}",
                key,
                format_type(field).dimmed(),
                format_bit_range(field),
            );
        }
    }

    let out_of_band: Vec<&StorageField> = layout
        .fields()
        .iter()
        .filter(|f| f.is_out_of_band())
        .collect();
    if !out_of_band.is_empty() {
        println!();
        println!("{}", "Out-of-band:".blue().bold());
        for field in out_of_band {
            println!(
                "    {:<24} {:<16} {}",
                field.key(),
                format_type(field).dimmed(),
                crate::accessor::out_of_band_key(field.id())
                    .to_string()
                    .dimmed(),
            );
        }
    }
}

/// Print slot count and packing efficiency.
pub fn print_summary(layout: &StorageLayout) {
    println!();
    println!(
        "  {} {} fields in {} slots ({:.1}% used)",
        "OK".green().bold(),
        layout.fields().len().to_string().cyan(),
        layout.slots().to_string().cyan(),
        utilization(layout) * 100.0,
    );
    if layout.fields().iter().any(StorageField::is_reserved) {
        println!(
            "  {} no field occupies a word; a reserved uint256 was added",
            "WARN".yellow().bold(),
        );
    }
}

// ── Verification ───────────────────────────────────────────────────

/// Print that a persisted layout matches the computed one.
pub fn print_verified(path: &Path) {
    println!(
        "  {} persisted layout {} matches",
        "OK".green().bold(),
        path.display().to_string().cyan(),
    );
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Feature, FieldDeclaration};

    fn layout(decls: &[FieldDeclaration]) -> StorageLayout {
        StorageLayout::compute(decls, &FeatureSet::new()).unwrap()
    }

    #[test]
    fn test_format_bit_range_scalar() {
        let layout = layout(&[
            FieldDeclaration::new(1, "a", "uint64"),
            FieldDeclaration::new(2, "b", "bool"),
        ]);
        assert_eq!(format_bit_range(layout.field_by_id(1).unwrap()), "[0..64)");
        assert_eq!(format_bit_range(layout.field_by_id(2).unwrap()), "[64..65)");
    }

    #[test]
    fn test_format_bit_range_spanning_and_out_of_band() {
        let layout = layout(&[
            FieldDeclaration::new(1, "owners", "address").with_array_length(2),
            FieldDeclaration::new(2, "bio", "string"),
        ]);
        assert_eq!(
            format_bit_range(layout.field_by_id(1).unwrap()),
            "512 bits over 2 slots"
        );
        assert_eq!(format_bit_range(layout.field_by_id(2).unwrap()), "out-of-band");
    }

    #[test]
    fn test_format_type() {
        let layout = layout(&[
            FieldDeclaration::new(1, "a", "uint8").with_array_length(4),
            FieldDeclaration::new(2, "b", "reference").with_array_length(0),
            FieldDeclaration::new(3, "c", "bool"),
        ]);
        assert_eq!(format_type(layout.field_by_id(1).unwrap()), "uint8[4]");
        assert_eq!(format_type(layout.field_by_id(2).unwrap()), "reference[]");
        assert_eq!(format_type(layout.field_by_id(3).unwrap()), "bool");
    }

    #[test]
    fn test_utilization() {
        let full = layout(&[FieldDeclaration::new(1, "a", "uint256")]);
        assert!((utilization(&full) - 1.0).abs() < 1e-9);

        let half = layout(&[FieldDeclaration::new(1, "a", "uint128")]);
        assert!((utilization(&half) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_format_features() {
        assert_eq!(format_features(&FeatureSet::new()), "none");
        let set: FeatureSet = [Feature::Mintable, Feature::FragmentMulti].into_iter().collect();
        assert_eq!(format_features(&set), "fragment-multi, mintable");
    }
}
