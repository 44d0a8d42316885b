//! Client-side record filtering
//!
//! Case-insensitive substring match across all textual fields of a crop
//! record. Filtering is a pure projection over the fetched set and match
//! positions are computed per character, so the original casing is
//! preserved in highlighted output.

use colored::Colorize;

use syncsrv::store::CropRecord;

/// Filter records by a case-insensitive substring query
///
/// An empty query returns the full set in its original order.
pub fn filter_records<'a>(records: &'a [CropRecord], query: &str) -> Vec<&'a CropRecord> {
    if query.trim().is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| record_matches(record, query))
        .collect()
}

/// True if any textual field of the record contains the query
pub fn record_matches(record: &CropRecord, query: &str) -> bool {
    text_fields(record)
        .iter()
        .any(|field| !find_matches(field, query).is_empty())
}

/// All textual fields of a record, in display order
fn text_fields(record: &CropRecord) -> [&str; 7] {
    [
        &record.name,
        &record.place,
        &record.crop,
        &record.planting_date,
        &record.harvest_date,
        &record.total_area,
        &record.total_yield,
    ]
}

/// Char ranges (start, end) of case-insensitive query occurrences
///
/// Comparison folds each character independently, so match offsets always
/// line up with the original text.
pub fn find_matches(text: &str, query: &str) -> Vec<(usize, usize)> {
    if query.is_empty() {
        return Vec::new();
    }

    let haystack: Vec<char> = text.chars().map(fold_char).collect();
    let needle: Vec<char> = query.chars().map(fold_char).collect();
    if needle.len() > haystack.len() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    let mut start = 0;
    while start + needle.len() <= haystack.len() {
        if haystack[start..start + needle.len()] == needle[..] {
            matches.push((start, start + needle.len()));
            start += needle.len();
        } else {
            start += 1;
        }
    }
    matches
}

fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Render a field with query matches highlighted
pub fn highlight(text: &str, query: &str) -> String {
    let matches = find_matches(text, query);
    if matches.is_empty() {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut cursor = 0;
    for (start, end) in matches {
        out.push_str(&chars[cursor..start].iter().collect::<String>());
        let matched: String = chars[start..end].iter().collect();
        out.push_str(&matched.yellow().bold().to_string());
        cursor = end;
    }
    out.push_str(&chars[cursor..].iter().collect::<String>());
    out
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn record(name: &str, crop: &str) -> CropRecord {
        CropRecord {
            id: 1,
            barangay: "A".to_string(),
            name: name.to_string(),
            place: "Centro".to_string(),
            crop: crop.to_string(),
            planting_date: "2026-01-08".to_string(),
            harvest_date: String::new(),
            total_area: "1.1".to_string(),
            total_yield: String::new(),
            synced_at: "t".to_string(),
            created_at: "t".to_string(),
        }
    }

    #[test]
    fn test_empty_query_returns_all_in_order() {
        let records = vec![record("Juan Reyes", "Rice"), record("Elena Garcia", "Wheat")];
        let visible = filter_records(&records, "");
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].name, "Juan Reyes");
        assert_eq!(visible[1].name, "Elena Garcia");

        // Repeated calls yield identical output
        let again = filter_records(&records, "");
        assert_eq!(
            visible.iter().map(|r| &r.name).collect::<Vec<_>>(),
            again.iter().map(|r| &r.name).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_case_insensitive_crop_match() {
        let records = vec![
            record("Juan Reyes", "Rice"),
            record("Elena Garcia", "Wheat"),
            record("Ana Cruz", "Corn"),
        ];
        let visible = filter_records(&records, "wheat");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].crop, "Wheat");
    }

    #[test]
    fn test_match_across_any_field() {
        let records = vec![record("Juan Reyes", "Rice"), record("Ana Cruz", "Corn")];
        // Matches the planting date field
        assert_eq!(filter_records(&records, "2026-01").len(), 2);
        // Matches the place field
        assert_eq!(filter_records(&records, "centro").len(), 2);
        // Matches nothing
        assert!(filter_records(&records, "durian").is_empty());
    }

    #[test]
    fn test_find_matches_positions() {
        assert_eq!(find_matches("Wheat", "wheat"), vec![(0, 5)]);
        assert_eq!(find_matches("ricey rice", "RICE"), vec![(0, 4), (6, 10)]);
        assert!(find_matches("Corn", "wheat").is_empty());
        assert!(find_matches("Corn", "").is_empty());
    }

    #[test]
    fn test_highlight_wraps_match() {
        colored::control::set_override(true);
        let rendered = highlight("Wheat field", "wheat");
        // The matched substring is wrapped in ANSI escapes, original case kept
        assert!(rendered.contains("\u{1b}["));
        assert!(rendered.contains("Wheat"));
        assert!(rendered.ends_with(" field"));
        colored::control::unset_override();
    }

    #[test]
    fn test_highlight_no_match_is_identity() {
        let rendered = highlight("Corn", "wheat");
        assert_eq!(rendered, "Corn");
    }
}
