use chrono::NaiveDate;

use crate::taxonomy;

/// Characters of document text embedded in a prompt
pub const MAX_DOCUMENT_CHARS: usize = 5000;

/// Response format section of the classification prompt
pub const CLASSIFY_RESPONSE_FORMAT: &str = r#"=== RESPONSE FORMAT ===
Respond with ONLY the category and subcategory in this exact format:
Category/Subcategory

If no subcategory applies, respond with just:
Category

Examples of valid responses:
- Medical/Anthony
- Medical/Oliver
- Financial/Receipts/2025
- Financial/Bills/Electric
- Financial/Insurance/Auto Home
- Financial/Taxes/2024
- Career/Certifications
- Cars/2022 Accord
- Purchases/Tickets/2025
- Purchases/Product Manuals/Appliances
- Financial/Checks
- Personal/Government Documents
- Misc"#;

/// Naming rules for the filename prompt
pub const FILENAME_RULES: &str = r#"=== DESCRIPTION RULES ===
The description should be 2-8 words that specifically describe WHAT this document is about. Extract this information from the document contents.

WHEN TO INCLUDE A PERSON'S NAME:
- YES: Medical records, lab results, doctor visits, prescriptions (the patient's name matters)
- YES: School records, report cards, transcripts (the student's name matters)
- YES: Personal legal documents like wills, immigration papers (the person's name matters)
- YES: Employment records specific to one person
- NO: Product purchases, shipments, returns, warranties (the product matters, not who bought it)
- NO: Utility bills, subscriptions, memberships (the service matters, not the account holder)
- NO: General receipts, invoices for products/services
- NO: Home repairs, maintenance records
- NO: Insurance policies, unless it's a claim for a specific person's medical care

WHAT TO INCLUDE IN THE DESCRIPTION:
- Be specific about WHAT the document is (not just "receipt" but what it's for)
- Include the product name, service type, or procedure when relevant
- Include the company or provider name if it adds clarity
- If there's a person's name AND it's relevant per the rules above, include their first name

=== EXAMPLE FILENAMES (FORMAT REFERENCE ONLY - DO NOT USE THESE NAMES/DETAILS) ===

Medical/Healthcare (include patient name):
- "2025-03-15 - John Annual Physical Results"
- "2025-06-22 - Sarah Allergy Test Results"
- "2025-01-05 - Emma Dental Cleaning Receipt"

Products/Shipments/Warranties (NO person name needed):
- "2025-02-14 - Dyson Vacuum Warranty Registration"
- "2025-09-28 - Maytronics Pool Robot Return Label"
- "2025-12-01 - Amazon Return Confirmation"

Bills/Utilities/Subscriptions (NO person name needed):
- "2025-01-15 - Electric Bill January"
- "2025-06-30 - Internet Service Invoice"

Financial/Banking (NO person name needed):
- "2025-03-31 - Bank Statement Q1"
- "2025-07-20 - Credit Card Statement July"

Insurance (include name only for personal claims):
- "2025-05-10 - Auto Insurance Policy Renewal"
- "2025-02-28 - David Medical Claim EOB"

Legal/Government (include name when document is person-specific):
- "2025-01-20 - Vehicle Registration Renewal"
- "2025-09-05 - Amy Passport Renewal Application"

Education (include student name):
- "2025-05-30 - Kevin Report Card Spring"

Home/Repairs (NO person name needed):
- "2025-04-25 - HVAC Maintenance Invoice"
- "2025-10-30 - Roof Inspection Report""#;

/// First [`MAX_DOCUMENT_CHARS`] characters of `text`
pub fn document_excerpt(text: &str) -> &str {
    match text.char_indices().nth(MAX_DOCUMENT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the classification prompt for a document
pub fn build_classify_prompt(text: &str) -> String {
    format!(
        r#"Your task is to classify a document into the appropriate category and subcategory.

IMPORTANT: Read the document contents carefully and determine:
1. The main CATEGORY this document belongs to
2. The SUBCATEGORY if applicable (based on the rules below)

{}
{}

=== DOCUMENT CONTENTS ===
{}

=== YOUR RESPONSE (category/subcategory only, nothing else) ==="#,
        taxonomy::describe_for_prompt(),
        CLASSIFY_RESPONSE_FORMAT,
        document_excerpt(text)
    )
}

/// Build the filename prompt. `created` is used only when the document
/// itself carries no date.
pub fn build_filename_prompt(text: &str, created: NaiveDate) -> String {
    let created = created.format("%Y-%m-%d");
    format!(
        r#"Your task is to analyze a document and generate a descriptive filename.

IMPORTANT: You must extract ALL information from the DOCUMENT CONTENTS provided below. Do NOT use any names, dates, or details from my instructions or examples. The examples below are ONLY to show you the FORMAT - the actual content must come from the document.

=== OUTPUT FORMAT ===
Generate a filename in this exact format:
"YYYY-MM-DD - Brief Description"

=== DATE SELECTION RULES ===
Choose the date using this priority order (use the FIRST one you find in the document):
1. Appointment date, service date, or due date mentioned in the document
2. Date printed on the document header, letterhead, or statement date
3. Invoice date or transaction date
4. If no date is found in the document, use the file created date: {created}

The date MUST be in YYYY-MM-DD format (e.g., 2025-01-15).

{rules}

=== YOUR TASK ===
1. Read the document contents below carefully
2. Extract the relevant date from the document (or use the file created date if none found)
3. Determine what type of document this is
4. Create a specific, descriptive filename following the rules above
5. Respond with ONLY the filename, nothing else

=== DOCUMENT CONTENTS ===
{excerpt}

=== FILE CREATED DATE (use only if no date found in document) ===
{created}

=== YOUR RESPONSE (filename only) ==="#,
        created = created,
        rules = FILENAME_RULES,
        excerpt = document_excerpt(text)
    )
}
