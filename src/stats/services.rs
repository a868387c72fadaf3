use std::fmt::Write;

use crate::users::LedgerStats;

pub const STATS_DENIED: &str = "This command is available to admins only.";

/// Share of `part` in `whole`, in whole percent.
fn percent(part: i64, whole: i64) -> i64 {
    if whole <= 0 {
        0
    } else {
        (part * 100 + whole / 2) / whole
    }
}

/// Plain-text conversion report for admins.
pub fn format_report(stats: &LedgerStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📊 Users: {}", stats.total_users);
    let _ = writeln!(
        out,
        "🎁 Rewarded: {} ({}%)",
        stats.rewarded_users,
        percent(stats.rewarded_users, stats.total_users)
    );

    if stats.by_source.is_empty() {
        return out.trim_end().to_string();
    }

    let _ = writeln!(out, "\nTop sources:");
    for (i, s) in stats.by_source.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}: {} users, {} rewarded ({}%)",
            i + 1,
            s.source,
            s.total,
            s.rewarded,
            percent(s.rewarded, s.total)
        );
    }
    out.trim_end().to_string()
}
