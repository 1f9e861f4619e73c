//! Loader for `.terrain` files.
//!
//! Layout, one value per line unless noted:
//!
//! ```text
//! local            source tag; anything else is a remote URL
//! 3                rows
//! 4                columns
//! 2                number of sources
//! 0 0              source row and column (column may sit on the next line)
//! 2 3
//! 1 2 3 4 ...      heights, whitespace separated, row-major
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::grid::{Grid, GridLocation};

pub const TERRAIN_EXT: &str = "terrain";
const LOCAL_TAG: &str = "local";

/// Largest grid a terrain file may declare (64M cells, 512 MB of heights).
pub const MAX_CELLS: usize = 64_000_000;

/// Heights plus the cells water enters from. Sources are always in bounds.
#[derive(Clone, Debug)]
pub struct Terrain {
    pub heights: Grid<f64>,
    pub sources: Vec<GridLocation>,
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Heights:")?;
        for (r, row) in self.heights.data.chunks(self.heights.cols).enumerate() {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(c, h)| format!("({r},{c}): {h}"))
                .collect();
            writeln!(f, "{}", cells.join(", "))?;
        }
        writeln!(f, "Sources:")?;
        let srcs: Vec<String> = self.sources.iter().map(ToString::to_string).collect();
        write!(f, "{}", srcs.join(", "))
    }
}

struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    line_no: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.lines().enumerate(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> Result<&'a str> {
        match self.inner.next() {
            Some((i, line)) => {
                self.line_no = i + 1;
                Ok(line)
            }
            None => Err(Error::UnexpectedEof(self.line_no + 1)),
        }
    }

    fn next_value<T: FromStr>(&mut self) -> Result<T> {
        let line = self.next_line()?;
        parse_token(line.trim(), self.line_no)
    }

    fn rest(self) -> impl Iterator<Item = (usize, &'a str)> {
        self.inner.map(|(i, line)| (i + 1, line))
    }
}

fn parse_token<T: FromStr>(tok: &str, line: usize) -> Result<T> {
    tok.parse().map_err(|_| Error::Parse {
        line,
        value: tok.to_string(),
    })
}

/// Parse the text of a `.terrain` file.
pub fn parse_terrain(text: &str) -> Result<Terrain> {
    let mut lines = Lines::new(text);

    let tag = lines.next_line()?.trim();
    if tag != LOCAL_TAG {
        return Err(Error::RemoteSource(tag.to_string()));
    }

    let rows: i64 = lines.next_value()?;
    let cols: i64 = lines.next_value()?;
    if rows <= 0 || cols <= 0 {
        return Err(Error::InvalidDimensions { rows, cols });
    }
    let cells = (rows as u64)
        .checked_mul(cols as u64)
        .ok_or(Error::InvalidDimensions { rows, cols })?;
    if cells > MAX_CELLS as u64 {
        return Err(Error::TooManyCells {
            cells,
            max: MAX_CELLS,
        });
    }
    let (rows, cols) = (rows as usize, cols as usize);

    let sources = read_sources(&mut lines, rows, cols)?;
    let heights = read_heights(lines, rows, cols)?;

    log::debug!("parsed {rows}x{cols} terrain with {} sources", sources.len());
    Ok(Terrain { heights, sources })
}

fn read_sources(lines: &mut Lines<'_>, rows: usize, cols: usize) -> Result<Vec<GridLocation>> {
    let count: i64 = lines.next_value()?;
    if count <= 0 {
        return Err(Error::InvalidSourceCount(count));
    }

    // Count is untrusted; a short file surfaces as UnexpectedEof.
    let mut sources = Vec::new();
    for _ in 0..count {
        let line = lines.next_line()?;
        let line_no = lines.line_no;
        let mut toks = line.split_whitespace();
        let row: i32 = match toks.next() {
            Some(tok) => parse_token(tok, line_no)?,
            None => return Err(Error::Parse { line: line_no, value: String::new() }),
        };
        let col: i32 = match toks.next() {
            Some(tok) => parse_token(tok, line_no)?,
            None => lines.next_value()?,
        };

        let loc = GridLocation::new(row, col);
        if !loc.in_bounds(rows, cols) {
            return Err(Error::SourceOutOfBounds {
                source_loc: loc,
                rows,
                cols,
            });
        }
        sources.push(loc);
    }
    Ok(sources)
}

fn read_heights(lines: Lines<'_>, rows: usize, cols: usize) -> Result<Grid<f64>> {
    let expected = rows * cols;
    let mut heights: Grid<f64> = Grid::new(rows, cols);
    let mut found = 0;

    // Tokens past the last height are never parsed, so trailing junk is tolerated.
    'outer: for (line_no, line) in lines.rest() {
        for tok in line.split_whitespace() {
            if found == expected {
                break 'outer;
            }
            heights.data[found] = parse_token(tok, line_no)?;
            found += 1;
        }
    }

    if found < expected {
        return Err(Error::MissingHeights { expected, found });
    }
    Ok(heights)
}

/// Load `<dir>/<name>.terrain`.
pub fn load_terrain(dir: &Path, name: &str) -> Result<Terrain> {
    let path = dir.join(format!("{name}.{TERRAIN_EXT}"));
    log::info!("loading {}", path.display());
    let text = fs::read_to_string(&path).map_err(|err| Error::Io {
        path: path.clone(),
        err,
    })?;
    parse_terrain(&text)
}

/// Names (without extension) of every `.terrain` file in `dir`, sorted.
pub fn available_terrains(dir: &Path) -> Result<Vec<String>> {
    let io_err = |err| Error::Io {
        path: dir.to_path_buf(),
        err,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(TERRAIN_EXT) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}
