//! The static category table.

/// Folder for documents whose category is unknown. The trailing space is
/// part of the real folder name.
pub const CATCH_ALL_FOLDER: &str = "Misc. ";

/// Whether a category's subcategory becomes a folder below it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubfolderRule {
    /// Subcategory segments are appended to the category folder
    Append,
    /// The category is filed flat; any subcategory is ignored
    None,
}

/// One category of the taxonomy
#[derive(Debug)]
pub struct TaxonomyEntry {
    /// Canonical key as the classifier writes it, e.g. `Financial/Bills`
    pub key: &'static str,
    /// Folder segments below the documents base
    pub folder: &'static [&'static str],
    pub subfolders: SubfolderRule,
    /// What the subcategory means, e.g. `Patient Name`
    pub subcategory_label: Option<&'static str>,
    /// Closed set of subcategories, if the category has one
    pub subcategories: Option<&'static [&'static str]>,
    pub summary: &'static [&'static str],
    pub example: Option<&'static str>,
    pub notes: &'static [&'static str],
}

impl TaxonomyEntry {
    /// The closed-set spelling of `sub`, ignoring case
    pub fn canonical_subcategory(&self, sub: &str) -> Option<&'static str> {
        let sub = sub.trim();
        self.subcategories?
            .iter()
            .copied()
            .find(|known| known.eq_ignore_ascii_case(sub))
    }
}

/// Subcategory labels whose folder is spelled differently on disk:
/// `(category, label, folder)`
pub const SUBFOLDER_OVERRIDES: &[(&str, &str, &str)] = &[
    ("Financial/Cards", "Sams Club", "Sam's Club"),
    ("Financial/Insurance", "Auto Home", "Encompass:Safeco"),
    ("Financial/Insurance", "Health Dental Vision", "Health:Dental:Vision"),
];

pub(super) fn override_for(category: &str, label: &str) -> Option<&'static str> {
    SUBFOLDER_OVERRIDES
        .iter()
        .find(|(cat, from, _)| *cat == category && from.eq_ignore_ascii_case(label.trim()))
        .map(|(_, _, folder)| *folder)
}

const YEAR_NOTE: &str = "Subcategory should be the year (e.g., 2024, 2025)";

const fn flat(key: &'static str, folder: &'static [&'static str], summary: &'static [&'static str]) -> TaxonomyEntry {
    TaxonomyEntry {
        key,
        folder,
        subfolders: SubfolderRule::None,
        subcategory_label: None,
        subcategories: None,
        summary,
        example: None,
        notes: &[],
    }
}

/// Leaf under `Financial/` that still accepts an ad-hoc subfolder
const fn financial(
    key: &'static str,
    folder: &'static [&'static str],
    summary: &'static [&'static str],
) -> TaxonomyEntry {
    TaxonomyEntry {
        key,
        folder,
        subfolders: SubfolderRule::Append,
        subcategory_label: None,
        subcategories: None,
        summary,
        example: None,
        notes: &[],
    }
}

pub static ENTRIES: &[TaxonomyEntry] = &[
    TaxonomyEntry {
        key: "Medical",
        folder: &["Medical"],
        subfolders: SubfolderRule::Append,
        subcategory_label: Some("Patient Name"),
        subcategories: Some(&["Anthony", "Hannah", "Oliver", "Roman"]),
        summary: &["Medical records, lab results, doctor visits, prescriptions, dental records, vision exams"],
        example: Some("\"Medical/Oliver\" for Oliver's medical records"),
        notes: &[],
    },
    TaxonomyEntry {
        key: "Financial/Bills",
        folder: &["Financial", "Bills"],
        subfolders: SubfolderRule::Append,
        subcategory_label: Some("Bill Type"),
        subcategories: Some(&["HOA", "Electric", "Gas", "Water", "Internet", "Lawn", "Storage", "Health", "Medical"]),
        summary: &["Recurring bills and utility statements"],
        example: Some("\"Financial/Bills/Electric\" for electric bills"),
        notes: &[],
    },
    TaxonomyEntry {
        key: "Financial/Cards",
        folder: &["Financial", "Cards"],
        subfolders: SubfolderRule::Append,
        subcategory_label: Some("Card Provider"),
        subcategories: Some(&["Chase", "Target", "Sams Club"]),
        summary: &["Credit card statements and card-related documents"],
        example: Some("\"Financial/Cards/Chase\" for Chase card statements"),
        notes: &[],
    },
    financial("Financial/Checks", &["Financial", "Checks"], &["Check images, check copies, deposited checks"]),
    financial("Financial/Class Action", &["Financial", "Class Action"], &["Class action lawsuit documents, settlements"]),
    TaxonomyEntry {
        key: "Financial/Home Maintenance",
        folder: &["Financial", "Home Maintenance"],
        subfolders: SubfolderRule::Append,
        subcategory_label: Some("Type"),
        subcategories: Some(&["HVAC", "Pool"]),
        summary: &["Home repair invoices, maintenance records, contractor receipts"],
        example: Some("\"Financial/Home Maintenance/Pool\" for pool service"),
        notes: &[],
    },
    TaxonomyEntry {
        key: "Financial/Insurance",
        folder: &["Financial", "Insurance"],
        subfolders: SubfolderRule::Append,
        subcategory_label: Some("Insurance Type"),
        subcategories: Some(&["Auto Home", "Health Dental Vision"]),
        summary: &["Insurance policies, declarations, claims"],
        example: Some("\"Financial/Insurance/Auto Home\" for auto or homeowners insurance"),
        notes: &[],
    },
    TaxonomyEntry {
        key: "Financial/Investments",
        folder: &["Financial", "Investments"],
        subfolders: SubfolderRule::Append,
        subcategory_label: Some("Account Type"),
        subcategories: Some(&["401k", "Roth IRA", "Stocks"]),
        summary: &["Investment statements, account documents"],
        example: Some("\"Financial/Investments/401k\" for 401k statements"),
        notes: &[],
    },
    financial(
        "Financial/Legal",
        &["Financial", "Legal"],
        &["Legal documents, contracts, agreements (non-insurance, non-mortgage)"],
    ),
    financial("Financial/Mortgage", &["Financial", "Mortgage"], &["Mortgage documents, loan statements, property paperwork"]),
    financial("Financial/Paystubs", &["Financial", "Paystubs"], &["Pay stubs, salary statements, W-2s, employment income"]),
    TaxonomyEntry {
        key: "Financial/Receipts",
        folder: &["Financial", "Receipts"],
        subfolders: SubfolderRule::Append,
        subcategory_label: Some("Year"),
        subcategories: None,
        summary: &["Purchase receipts, transaction receipts", YEAR_NOTE],
        example: Some("\"Financial/Receipts/2025\" for 2025 receipts"),
        notes: &[],
    },
    TaxonomyEntry {
        key: "Financial/Taxes",
        folder: &["Financial", "Taxes"],
        subfolders: SubfolderRule::Append,
        subcategory_label: Some("Tax Year"),
        subcategories: None,
        summary: &[
            "Tax returns, tax forms, tax-related documents",
            "Subcategory should be the tax year (e.g., 2023, 2024)",
        ],
        example: Some("\"Financial/Taxes/2024\" for 2024 tax documents"),
        notes: &[],
    },
    financial("Financial/Tolls", &["Financial", "Tolls"], &["Toll road receipts, toll statements"]),
    financial("Financial/Misc", &["Financial", "Misc."], &["Other financial documents that don't fit elsewhere"]),
    TaxonomyEntry {
        key: "Career",
        folder: &["Career"],
        subfolders: SubfolderRule::Append,
        subcategory_label: Some("Type"),
        subcategories: Some(&["Certifications", "Resumes", "Business Cards"]),
        summary: &["Employment documents, professional certifications, resumes"],
        example: Some("\"Career/Certifications\" for professional certifications"),
        notes: &["For employer-specific docs, use just \"Career\" with no subcategory"],
    },
    TaxonomyEntry {
        key: "Cars",
        folder: &["Cars"],
        subfolders: SubfolderRule::Append,
        subcategory_label: Some("Vehicle"),
        subcategories: Some(&["2021 Sequoia", "2022 Accord"]),
        summary: &["Vehicle titles, registration, non-financial car documents"],
        example: Some("\"Cars/2022 Accord\" for 2022 Honda Accord documents"),
        notes: &[],
    },
    flat(
        "Kids/School",
        &["Kids", "School"],
        &["School records, report cards, transcripts, education documents"],
    ),
    flat(
        "Personal/Government Documents",
        &["Personal", "Government Documents"],
        &["Passports, birth certificates, social security, government IDs"],
    ),
    flat("Personal/Letters", &["Personal", "Letters"], &["Personal correspondence, letters, cards"]),
    flat(
        "Personal/Spiritual",
        &["Personal", "Spiritual"],
        &["Religious documents, church records, spiritual materials"],
    ),
    TaxonomyEntry {
        key: "Purchases/Tickets",
        folder: &["Purchases", "Tickets"],
        subfolders: SubfolderRule::Append,
        subcategory_label: Some("Year"),
        subcategories: None,
        summary: &["Event tickets, concert tickets, admission tickets", YEAR_NOTE],
        example: Some("\"Purchases/Tickets/2025\" for 2025 event tickets"),
        notes: &[],
    },
    TaxonomyEntry {
        key: "Purchases/Product Manuals",
        folder: &["Purchases", "Product Manuals"],
        subfolders: SubfolderRule::Append,
        subcategory_label: Some("Product Category"),
        subcategories: Some(&["Appliances", "Home", "Tools", "Toys", "Music", "Baby Products", "Amazon Basics"]),
        summary: &["User manuals, instruction booklets, product documentation"],
        example: Some("\"Purchases/Product Manuals/Appliances\" for appliance manuals"),
        notes: &[],
    },
    TaxonomyEntry {
        subfolders: SubfolderRule::Append,
        ..flat(
            "Purchases/Other",
            &["Purchases", "Other"],
            &["General purchase confirmations, shipping notifications, order receipts"],
        )
    },
    flat("Sheet Music", &["Sheet Music"], &["Musical scores, chord sheets, sheet music"]),
    flat("Recipes", &["Recipes"], &["Recipe documents, cooking instructions"]),
    flat("User Manuals", &["User Manuals"], &["General user manuals (non-product specific)"]),
    flat("Misc", &[CATCH_ALL_FOLDER], &["Anything that doesn't fit the above categories"]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique_ignoring_case() {
        let keys: HashSet<String> = ENTRIES.iter().map(|e| e.key.to_lowercase()).collect();
        assert_eq!(keys.len(), ENTRIES.len());
    }

    #[test]
    fn test_folder_matches_key_except_misc() {
        for entry in ENTRIES {
            assert!(!entry.folder.is_empty(), "{}", entry.key);
            if !entry.key.ends_with("Misc") {
                assert_eq!(entry.folder.join("/"), entry.key);
            }
        }
    }

    #[test]
    fn test_override_labels_belong_to_closed_sets() {
        for (category, label, _) in SUBFOLDER_OVERRIDES {
            let entry = ENTRIES.iter().find(|e| e.key == *category).unwrap();
            assert_eq!(entry.canonical_subcategory(label), Some(*label));
        }
    }

    #[test]
    fn test_canonical_subcategory_ignores_case() {
        let cards = ENTRIES.iter().find(|e| e.key == "Financial/Cards").unwrap();
        assert_eq!(cards.canonical_subcategory(" sams club "), Some("Sams Club"));
        assert_eq!(cards.canonical_subcategory("Amex"), None);
    }
}
