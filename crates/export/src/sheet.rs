use std::collections::HashSet;

/// Excel's limit on worksheet name length, in characters.
pub const MAX_SHEET_NAME: usize = 31;

/// Replace the characters Excel rejects in sheet names and cut to 31 chars.
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | '*' | '?' | ':' | '[' | ']' => '_',
            c => c,
        })
        .collect();
    // Leading or trailing apostrophes are rejected too.
    let trimmed = replaced.trim().trim_matches('\'');
    if trimmed.is_empty() {
        return "Sheet".to_string();
    }
    trimmed.chars().take(MAX_SHEET_NAME).collect()
}

/// Hands out sheet names that are unique within one workbook.
///
/// Excel compares names case-insensitively; clashes get `_1`, `_2`, …
/// appended, truncating the base so the result still fits.
#[derive(Debug, Default)]
pub struct SheetNames {
    used: HashSet<String>,
}

impl SheetNames {
    pub fn new() -> Self {
        let mut names = Self::default();
        // Reserved by Excel.
        names.used.insert("history".to_string());
        names
    }

    pub fn unique(&mut self, name: &str) -> String {
        let base = sanitize_sheet_name(name);
        if self.used.insert(base.to_lowercase()) {
            return base;
        }

        let mut n = 1usize;
        loop {
            let suffix = format!("_{n}");
            let keep = MAX_SHEET_NAME - suffix.chars().count();
            let candidate: String = base.chars().take(keep).chain(suffix.chars()).collect();
            if self.used.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}
