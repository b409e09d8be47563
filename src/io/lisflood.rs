//! Readers for LISFLOOD-FP text outputs and inputs: mass balance, discharge and
//! stage series, stage gauge locations, boundary condition files and
//! parameter files. Gridded results can be pulled out of a zipped results
//! directory and written as GeoTIFF.
//!
//! Time columns are offsets from a simulation start date, in seconds for
//! model outputs and hours for `.bdy` boundary series.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use ndarray::{Array2, ArrayView1};
use tracing::{debug, info};
use zip::ZipArchive;

use crate::core::params::DEFAULT_NODATA;
use crate::error::{Error, Result};
use crate::io::ascii::parse_ascii_grid;
use crate::io::writers::tiff::write_geotiff_f64;
use crate::io::writers::worldfile::{write_prj_file, write_world_file};

const SECONDS: f64 = 1.0;
const HOURS: f64 = 3600.0;

/// Time-indexed table: one row per time step, one column per series
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub times: Vec<NaiveDateTime>,
    pub columns: Vec<String>,
    /// `(times.len(), columns.len())`
    pub values: Array2<f64>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.values.column(idx))
    }
}

/// Stage gauge location from a `.stage` header
#[derive(Debug, Clone, PartialEq)]
pub struct StageLocation {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub elev: f64,
}

/// One boundary condition from a `.bci` file
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCondition {
    pub boundary: String,
    pub x: f64,
    pub y: f64,
    pub kind: String,
    pub name: String,
}

/// Parameter file entries, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParFile {
    pub entries: Vec<(String, String)>,
}

impl ParFile {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text.lines().map(str::to_string).collect())
}

fn find_line(lines: &[String], phrase: &str, path: &Path) -> Result<usize> {
    lines
        .iter()
        .position(|l| l.contains(phrase))
        .ok_or_else(|| Error::value(format!("{}: no line containing `{}`", path.display(), phrase)))
}

fn parse_number(token: &str, path: &Path, line: usize) -> Result<f64> {
    token.parse::<f64>().map_err(|_| {
        Error::value(format!(
            "{}:{}: `{}` is not a number",
            path.display(),
            line + 1,
            token
        ))
    })
}

fn parse_row(line: &str, path: &Path, lineno: usize) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|t| parse_number(t, path, lineno))
        .collect()
}

fn offset_time(start: NaiveDate, amount: f64, unit: f64) -> Result<NaiveDateTime> {
    let millis = amount * unit * 1000.0;
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Err(Error::value(format!("time offset {} out of range", amount)));
    }
    start
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::milliseconds(millis.round() as i64))
        .ok_or_else(|| Error::value(format!("time offset {} out of range", amount)))
}

/// Split numeric rows into a time column and value columns.
fn build_series(
    rows: Vec<Vec<f64>>,
    time_col: usize,
    columns: Vec<String>,
    start: NaiveDate,
    unit: f64,
    path: &Path,
) -> Result<TimeSeries> {
    let width = columns.len() + 1;
    let mut times = Vec::with_capacity(rows.len());
    let mut flat = Vec::with_capacity(rows.len() * columns.len());
    for (idx, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(Error::value(format!(
                "{}: data row {} has {} values, expected {}",
                path.display(),
                idx + 1,
                row.len(),
                width
            )));
        }
        times.push(offset_time(start, row[time_col], unit)?);
        flat.extend(
            row.iter()
                .enumerate()
                .filter(|(c, _)| *c != time_col)
                .map(|(_, v)| *v),
        );
    }
    let values = Array2::from_shape_vec((times.len(), columns.len()), flat)
        .map_err(|e| Error::value(format!("{}: {}", path.display(), e)))?;
    debug!(
        "{}: {} time steps x {} series",
        path.display(),
        times.len(),
        columns.len()
    );
    Ok(TimeSeries {
        times,
        columns,
        values,
    })
}

/// Read a `.mass` file: header line naming columns, `Time` in seconds.
/// A trailing `res` column numbers the output steps from 0.
pub fn read_mass<P: AsRef<Path>>(path: P, start: NaiveDate) -> Result<TimeSeries> {
    let path = path.as_ref();
    let lines = read_lines(path)?;
    let mut body = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = body
        .next()
        .ok_or_else(|| Error::value(format!("{}: empty mass file", path.display())))?;
    let header: Vec<&str> = header.split_whitespace().collect();
    let time_col = header
        .iter()
        .position(|h| *h == "Time")
        .ok_or_else(|| Error::value(format!("{}: no `Time` column", path.display())))?;
    let mut columns: Vec<String> = header
        .iter()
        .enumerate()
        .filter(|(c, _)| *c != time_col)
        .map(|(_, h)| h.to_string())
        .collect();
    columns.push("res".to_string());

    let rows = body
        .enumerate()
        .map(|(step, (n, l))| {
            let mut row = parse_row(l, path, n)?;
            row.push(step as f64);
            Ok(row)
        })
        .collect::<Result<Vec<_>>>()?;
    build_series(rows, time_col, columns, start, SECONDS, path)
}

/// Rows after the first line containing `Time`; column 0 is seconds, the
/// remaining columns are named `1..n`.
fn read_after_time_marker(path: &Path, start: NaiveDate) -> Result<TimeSeries> {
    let lines = read_lines(path)?;
    let first = find_line(&lines, "Time", path)? + 1;
    let rows = lines[first..]
        .iter()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(n, l)| parse_row(l, path, first + n))
        .collect::<Result<Vec<_>>>()?;

    let width = rows.first().map(|r| r.len()).unwrap_or(1);
    if width == 0 {
        return Err(Error::value(format!("{}: no data columns", path.display())));
    }
    let columns = (1..width).map(|c| c.to_string()).collect();
    build_series(rows, 0, columns, start, SECONDS, path)
}

/// Read a `.discharge` file.
pub fn read_discharge<P: AsRef<Path>>(path: P, start: NaiveDate) -> Result<TimeSeries> {
    read_after_time_marker(path.as_ref(), start)
}

/// Read a `.stage` file.
pub fn read_stage<P: AsRef<Path>>(path: P, start: NaiveDate) -> Result<TimeSeries> {
    read_after_time_marker(path.as_ref(), start)
}

/// Read gauge locations from a `.stage` header: rows after `Stage information`
/// up to the line before `Output, depths:`.
pub fn read_stage_locs<P: AsRef<Path>>(path: P) -> Result<Vec<StageLocation>> {
    let path = path.as_ref();
    let lines = read_lines(path)?;
    let first = find_line(&lines, "Stage information", path)? + 1;
    let end = find_line(&lines, "Output, depths:", path)?.saturating_sub(1);
    if end < first {
        return Err(Error::value(format!(
            "{}: stage location block is malformed",
            path.display()
        )));
    }

    let mut locs = Vec::new();
    for (n, line) in lines[first..end].iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() != 4 {
            return Err(Error::value(format!(
                "{}:{}: expected `id x y elev`",
                path.display(),
                first + n + 1
            )));
        }
        let lineno = first + n;
        locs.push(StageLocation {
            id: tokens[0].to_string(),
            x: parse_number(tokens[1], path, lineno)?,
            y: parse_number(tokens[2], path, lineno)?,
            elev: parse_number(tokens[3], path, lineno)?,
        });
    }
    Ok(locs)
}

/// Read a `.bci` file: one header line, then `boundary x y type name` rows.
pub fn read_bci<P: AsRef<Path>>(path: P) -> Result<Vec<BoundaryCondition>> {
    let path = path.as_ref();
    let lines = read_lines(path)?;

    let mut entries = Vec::new();
    for (n, line) in lines.iter().enumerate().skip(1) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < 5 {
            return Err(Error::value(format!(
                "{}:{}: expected `boundary x y type name`",
                path.display(),
                n + 1
            )));
        }
        entries.push(BoundaryCondition {
            boundary: tokens[0].to_string(),
            x: parse_number(tokens[1], path, n)?,
            y: parse_number(tokens[2], path, n)?,
            kind: tokens[3].to_string(),
            name: tokens[4].to_string(),
        });
    }
    Ok(entries)
}

/// Read a `.bdy` file. Each `N hours` line opens a block of N `value time`
/// rows; block values become one series each, named from the matching `.bci`
/// entries. Times (hours) come from the last block.
pub fn read_bdy<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    bcifile: Q,
    start: NaiveDate,
) -> Result<TimeSeries> {
    let path = path.as_ref();
    let lines = read_lines(path)?;

    let mut blocks: Vec<Vec<f64>> = Vec::new();
    let mut hours: Vec<f64> = Vec::new();
    for (num, line) in lines.iter().enumerate() {
        if !line.contains("hours") {
            continue;
        }
        let count_token = line.split_whitespace().next().unwrap_or("");
        let count = count_token.parse::<usize>().map_err(|_| {
            Error::value(format!(
                "{}:{}: `{}` is not a row count",
                path.display(),
                num + 1,
                count_token
            ))
        })?;
        let first = num + 1;
        let block = lines.get(first..first + count).ok_or_else(|| {
            Error::value(format!(
                "{}:{}: block of {} rows runs past end of file",
                path.display(),
                num + 1,
                count
            ))
        })?;

        let mut series = Vec::with_capacity(count);
        hours.clear();
        for (n, row) in block.iter().enumerate() {
            let row = parse_row(row, path, first + n)?;
            if row.len() < 2 {
                return Err(Error::value(format!(
                    "{}:{}: expected `value time`",
                    path.display(),
                    first + n + 1
                )));
            }
            series.push(row[0]);
            hours.push(row[1]);
        }
        blocks.push(series);
    }

    if blocks.is_empty() {
        return Err(Error::value(format!("{}: no `hours` blocks", path.display())));
    }
    let steps = hours.len();
    if let Some(bad) = blocks.iter().position(|b| b.len() != steps) {
        return Err(Error::value(format!(
            "{}: block {} has {} rows, expected {}",
            path.display(),
            bad + 1,
            blocks[bad].len(),
            steps
        )));
    }

    let names: Vec<String> = read_bci(bcifile)?.into_iter().map(|b| b.name).collect();
    if names.len() != blocks.len() {
        return Err(Error::value(format!(
            "{}: {} boundary series but {} names in BCI file",
            path.display(),
            blocks.len(),
            names.len()
        )));
    }

    let rows = (0..steps)
        .map(|t| {
            let mut row: Vec<f64> = blocks.iter().map(|b| b[t]).collect();
            row.push(hours[t]);
            row
        })
        .collect();
    let time_col = blocks.len();
    build_series(rows, time_col, names, start, HOURS, path)
}

/// Read a `.par` file: `key [value]` per line, missing values become "".
pub fn read_par<P: AsRef<Path>>(path: P) -> Result<ParFile> {
    let path = path.as_ref();
    let entries = read_lines(path)?
        .iter()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let key = tokens.next()?;
            let value = tokens.next().unwrap_or("");
            Some((key.to_string(), value.to_string()))
        })
        .collect();
    Ok(ParFile { entries })
}

/// Write one daily `var` grid (e.g. `wd`) from a zipped results directory as
/// a GeoTIFF at `output`, with `.tfw` and `.prj` sidecars.
///
/// Entries ending in `.{var}` are taken in name order, one per day from
/// `first` to `last` inclusive; `date` selects the entry.
pub fn extract_from_zip<P: AsRef<Path>, Q: AsRef<Path>>(
    results: P,
    date: NaiveDate,
    first: NaiveDate,
    last: NaiveDate,
    var: &str,
    proj: &str,
    output: Q,
) -> Result<PathBuf> {
    let results = results.as_ref();
    let output = output.as_ref();
    if date < first || date > last {
        return Err(Error::value(format!(
            "{} is outside the simulation period {} to {}",
            date, first, last
        )));
    }
    let day = (date - first).num_days() as usize;

    let mut archive = ZipArchive::new(File::open(results)?)?;
    let suffix = format!(".{}", var);
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| n.ends_with(&suffix))
        .map(str::to_string)
        .collect();
    names.sort();
    let name = names.get(day).ok_or_else(|| {
        Error::value(format!(
            "{}: {} `{}` entries, none for day {} ({})",
            results.display(),
            names.len(),
            suffix,
            day,
            date
        ))
    })?;

    let mut text = String::new();
    archive.by_name(name)?.read_to_string(&mut text)?;
    let grid = parse_ascii_grid(&text, name)?;
    let geometry = grid.header.geometry;
    let nodata = grid.header.nodata.unwrap_or(DEFAULT_NODATA);

    write_geotiff_f64(output, &geometry, &grid.data, nodata)?;
    write_world_file(output, geometry.geotransform())?;
    write_prj_file(output, proj)?;
    info!("Extracted {} for {} -> {}", name, date, output.display());
    Ok(output.to_path_buf())
}
