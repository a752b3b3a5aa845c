//! Fixed-width listing of scan results.

use std::fmt::Write as _;

use plotsift_shared::{OutputConfig, Record};

/// Width of the identifier column.
const ID_WIDTH: usize = 12;

/// Render the header plus one row per record.
pub(crate) fn render(records: &[Record], output: &OutputConfig) -> String {
    let mut out = String::new();
    push_row(&mut out, "IMDB_ID", "Title", "Plot", output);
    for record in records {
        push_row(
            &mut out,
            &record.id,
            truncate(&record.title, output.title_width),
            truncate(&record.plot, output.plot_width),
            output,
        );
    }
    out
}

fn push_row(out: &mut String, id: &str, title: &str, plot: &str, output: &OutputConfig) {
    let _ = writeln!(
        out,
        "{id:<iw$}|   {title:<tw$}|   {plot:<pw$}",
        iw = ID_WIDTH,
        tw = output.title_width,
        pw = output.plot_width,
    );
}

/// Cut `value` to at most `max_chars` characters.
fn truncate(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, title: &str, plot: &str) -> Record {
        Record {
            id: id.into(),
            title: title.into(),
            plot: plot.into(),
        }
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Carmencita", 4), "Carm");
        assert_eq!(truncate("Carmencita", 40), "Carmencita");
        assert_eq!(truncate("", 3), "");
        // Multi-byte characters are never split.
        assert_eq!(truncate("Été à Paris", 3), "Été");
    }

    #[test]
    fn renders_header_and_rows() {
        let output = OutputConfig::default();
        let listing = render(&[record("tt0000001", "Carmencita", "plot")], &output);
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("IMDB_ID     |   Title"));
        assert!(lines[1].starts_with("tt0000001   |   Carmencita"));
        // 12 + 4 + 40 + 4 + 50
        assert_eq!(lines[1].chars().count(), 110);
    }

    #[test]
    fn long_fields_are_cut_to_configured_widths() {
        let output = OutputConfig {
            title_width: 5,
            plot_width: 8,
        };
        let listing = render(
            &[record("tt0000001", "Carmencita", "Performing on what looks like a stage")],
            &output,
        );
        let row = listing.lines().nth(1).unwrap();

        assert_eq!(row, "tt0000001   |   Carme|   Performi");
    }

    #[test]
    fn empty_result_prints_only_header() {
        let listing = render(&[], &OutputConfig::default());
        assert_eq!(listing.lines().count(), 1);
    }
}
