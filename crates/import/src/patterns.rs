use regex::Regex;
use std::sync::OnceLock;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        pub(crate) fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Month/day with an optional two- or four-digit year, `/` or `-` separated.
re!(re_date_token_exact,
    r"^(?:\d{4}-\d{2}-\d{2}|\d{1,2}[/-]\d{1,2}(?:[/-](?:\d{4}|\d{2}))?)$");
re!(re_date_token_any,
    r"\b\d{1,2}[/-]\d{1,2}(?:[/-](?:\d{4}|\d{2}))?\b");

re!(re_amount_exact,
    r"^-?\$?\s?\d[\d,]*\.\d{2}$");
re!(re_amount_any,
    r"\d[\d,]*\.\d{2}\b");

// Date first, then description, amount, and an optional running balance.
re!(re_entry_line, concat!(
    r"^\s*(?P<date>\d{1,2}[/-]\d{1,2}(?:[/-](?:\d{4}|\d{2}))?)\s+",
    r"(?P<desc>.*?\S)\s+",
    r"(?P<amount>-?\$?\s?\d[\d,]*\.\d{2})",
    r"(?:\s+(?P<balance>-?\$?\s?\d[\d,]*\.\d{2}))?\s*$"
));

re!(re_deposit_header,
    r"(?i)^\s*deposits\s+and\s+other\s+(?:credits|additions)\b");
re!(re_withdrawal_header,
    r"(?i)^\s*withdrawals\s+and\s+other\s+(?:debits|subtractions)\b");

re!(re_total_line,
    r"(?i)^\s*total\b");
re!(re_section_end,
    r"(?i)^\s*(?:summary|balance|account|statement|daily\s+ledger\s+balances?|beginning\s+balance|ending\s+balance)\b");

re!(re_page_counter,
    r"(?i)\bpage\s+\d+\s+of\s+\d+\b");
re!(re_column_header,
    r"(?i)^\s*date\s+(?:posted\s+)?(?:transaction\s+)?description\b.*\bamount\b");
re!(re_continued_banner,
    r"(?i)continued\s+on\s+(?:the\s+)?next\s+page");

// Statement period banners.
re!(re_period_for_range, concat!(
    r"(?i)\bfor\s+([a-z]+)\s+(\d{1,2}),\s*(\d{4})\s+",
    r"(?:to|through|-)\s+([a-z]+)\s+(\d{1,2}),\s*(\d{4})"
));
re!(re_period_numeric,
    r"(?i)statement\s+period:?\s*(\d{1,2}/\d{1,2}/\d{4})\s*(?:-|to|through)\s*(\d{1,2}/\d{1,2}/\d{4})");
re!(re_beginning_balance,
    r"(?i)beginning\s+balance\s+on\s+([a-z]+)\s+(\d{1,2}),\s*(\d{4})");
re!(re_ending_balance,
    r"(?i)ending\s+balance\s+on\s+([a-z]+)\s+(\d{1,2}),\s*(\d{4})");

pub(crate) fn is_date_token(s: &str) -> bool {
    re_date_token_exact().is_match(s.trim())
}

pub(crate) fn is_amount_token(s: &str) -> bool {
    re_amount_exact().is_match(s.trim())
}

/// Trim and collapse every whitespace run to a single space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
