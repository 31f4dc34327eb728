use crate::pathfinder::Path;
use crate::theory::Tuning;

/// Default wrap width for tab systems, in characters.
pub const DEFAULT_WRAP_WIDTH: usize = 80;

/// Render a fingering sequence as text tablature: one line per string
/// (thinnest on top), one column per chord, wrapped into systems at
/// `wrap_width` characters with a blank line between systems.
pub fn render_tab(tuning: &Tuning, paths: &[Path], wrap_width: usize) -> String {
    let nstrings = tuning.nstrings();
    let names: Vec<String> = tuning
        .strings()
        .iter()
        .map(|pitch| pitch.degree().to_string())
        .collect();
    let name_width = names.iter().map(String::len).max().unwrap_or(0);

    let mut systems: Vec<Vec<String>> = Vec::new();
    let mut current = empty_system(&names, name_width);
    let mut current_width = name_width + 1;

    for path in paths {
        let column = chord_column(path, nstrings);
        let column_width = column[0].len();

        if current_width + column_width + 1 > wrap_width && current_width > name_width + 1 {
            close_system(&mut current);
            systems.push(current);
            current = empty_system(&names, name_width);
            current_width = name_width + 1;
        }

        for (line, cell) in current.iter_mut().zip(&column) {
            line.push_str(cell);
        }
        current_width += column_width;
    }

    // A piece with no chords renders bare string prefixes, no closing bar
    if !paths.is_empty() {
        close_system(&mut current);
    }
    systems.push(current);

    let mut out = String::new();
    for (i, system) in systems.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for line in system {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// One chord as a column of equal-width cells, dash-padded so every string
/// line stays aligned whatever the fret digit count.
fn chord_column(path: &Path, nstrings: usize) -> Vec<String> {
    let mut cells: Vec<String> = (0..nstrings)
        .map(|string| {
            path.iter()
                .find(|p| p.string == string)
                .map(|p| p.fret.to_string())
                .unwrap_or_default()
        })
        .collect();

    // Leading dash separates columns; trailing dashes pad to equal width
    let width = cells.iter().map(String::len).max().unwrap_or(1).max(1) + 2;
    for cell in &mut cells {
        cell.insert(0, '-');
        while cell.len() < width {
            cell.push('-');
        }
    }
    cells
}

fn empty_system(names: &[String], name_width: usize) -> Vec<String> {
    names
        .iter()
        .map(|name| format!("{name:<name_width$}|"))
        .collect()
}

fn close_system(system: &mut [String]) {
    for line in system {
        line.push('|');
    }
}
