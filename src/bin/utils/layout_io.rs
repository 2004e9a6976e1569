// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

#![allow(dead_code)]

use flate2::bufread::MultiGzDecoder;
use glob::glob;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::best_overlap::{BestEdge, BestOverlapGraph, READ_CONTAINED, READ_SUSPICIOUS, READ_ZOMBIE};
use super::error::{LayoutError, LayoutResult};
use super::overlap_cache::{Overlap, OverlapCache};
use super::read_info::ReadInfo;
use super::tig_vector::TigVector;

/// everything the layout stage needs from the upstream stages
pub struct LayoutInput {
    pub ri: ReadInfo,
    pub og: BestOverlapGraph,
    pub oc: OverlapCache,
}

#[derive(Debug, Clone, PartialEq)]
enum Record {
    Read(u32, u32),
    Best(u32, bool, BestEdge),
    Flag(u32, u8),
    Ovlp(Overlap),
}

impl Record {
    fn max_rid(&self) -> u32 {
        match self {
            Record::Read(rid, _) => *rid,
            Record::Best(rid, _, e) => (*rid).max(e.read_id),
            Record::Flag(rid, _) => *rid,
            Record::Ovlp(o) => o.a_iid.max(o.b_iid),
        }
    }
}

struct LineCtx<'a> {
    file: &'a str,
    line: usize,
}

impl<'a> LineCtx<'a> {
    fn error<S: Into<String>>(&self, message: S) -> LayoutError {
        LayoutError::Parse {
            file: self.file.to_string(),
            line: self.line,
            message: message.into(),
        }
    }

    fn field<T: FromStr>(&self, v: &[&str], i: usize, what: &str) -> LayoutResult<T> {
        let s = v
            .get(i)
            .ok_or_else(|| self.error(format!("missing field {} ({})", i, what)))?;
        s.parse::<T>()
            .map_err(|_| self.error(format!("can not parse {} from '{}'", what, s)))
    }

    fn rid(&self, v: &[&str], i: usize) -> LayoutResult<u32> {
        let rid: u32 = self.field(v, i, "read id")?;
        if rid == 0 {
            return Err(self.error("read id 0 is reserved"));
        }
        Ok(rid)
    }

    fn end(&self, v: &[&str], i: usize) -> LayoutResult<bool> {
        match v.get(i) {
            Some(&"3") => Ok(true),
            Some(&"5") => Ok(false),
            Some(s) => Err(self.error(format!("read end should be 5 or 3, got '{}'", s))),
            None => Err(self.error(format!("missing field {} (read end)", i))),
        }
    }
}

fn parse_record(ctx: &LineCtx, line: &str) -> LayoutResult<Option<Record>> {
    let v: Vec<&str> = line.split_whitespace().collect();
    let tag = match v.first() {
        Some(t) => *t,
        None => return Ok(None),
    };
    let rec = match tag {
        "R" => Record::Read(ctx.rid(&v, 1)?, ctx.field(&v, 2, "read length")?),
        "B" => {
            let rid = ctx.rid(&v, 1)?;
            let three_prime = ctx.end(&v, 2)?;
            let edge = BestEdge::new(
                ctx.rid(&v, 3)?,
                ctx.end(&v, 4)?,
                ctx.field(&v, 5, "a hang")?,
                ctx.field(&v, 6, "b hang")?,
                ctx.field(&v, 7, "score")?,
            );
            Record::Best(rid, three_prime, edge)
        }
        "C" => Record::Flag(ctx.rid(&v, 1)?, READ_CONTAINED),
        "Z" => Record::Flag(ctx.rid(&v, 1)?, READ_ZOMBIE),
        "S" => Record::Flag(ctx.rid(&v, 1)?, READ_SUSPICIOUS),
        "O" => {
            let flipped = match ctx.field::<u8>(&v, 3, "flipped flag")? {
                0 => false,
                1 => true,
                f => return Err(ctx.error(format!("flipped flag should be 0 or 1, got {}", f))),
            };
            Record::Ovlp(Overlap::new(
                ctx.rid(&v, 1)?,
                ctx.rid(&v, 2)?,
                flipped,
                ctx.field(&v, 4, "a hang")?,
                ctx.field(&v, 5, "b hang")?,
                ctx.field(&v, 6, "score")?,
            ))
        }
        _ => return Ok(None),
    };
    Ok(Some(rec))
}

/// plain or gzip compressed, decided by the first two bytes of the file;
/// every gzip member is read, not just the first
fn open_input(path: &Path) -> LayoutResult<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut is_gzfile = false;
    {
        let r = reader.by_ref();
        let mut buf = Vec::<u8>::new();
        let _ = r.take(2).read_to_end(&mut buf);
        if buf == [0x1F_u8, 0x8B_u8] {
            log::info!("input file: {} detected as gz-compressed file", path.display());
            is_gzfile = true;
        }
    }
    reader.seek(SeekFrom::Start(0))?;
    if is_gzfile {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

fn read_records(path: &Path) -> LayoutResult<Vec<Record>> {
    let file = path.to_string_lossy().into_owned();
    let reader = open_input(path)?;
    let mut records = Vec::<Record>::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let ctx = LineCtx {
            file: &file,
            line: i + 1,
        };
        if let Some(rec) = parse_record(&ctx, &line)? {
            records.push(rec);
        }
    }
    log::debug!("read_records: {} records from {}", records.len(), file);
    Ok(records)
}

fn input_files(prefix: &str) -> LayoutResult<Vec<PathBuf>> {
    let infile_pattern = [prefix, "*"].concat();
    let mut files = Vec::<PathBuf>::new();
    for entry in glob(&infile_pattern)? {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path)
                }
            }
            Err(e) => log::warn!("skipping unreadable input path: {:?}", e),
        }
    }
    files.sort();
    if files.is_empty() {
        return Err(LayoutError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no input files match {}", infile_pattern),
        )));
    }
    Ok(files)
}

/// Load reads, best edges, flags and overlaps from every file matching
/// `prefix*`. The files are parsed in parallel.
pub fn load_layout_input(prefix: &str) -> LayoutResult<LayoutInput> {
    let files = input_files(prefix)?;
    log::info!("load_layout_input: {} input file(s) for prefix {}", files.len(), prefix);

    let records = files
        .par_iter()
        .map(|p| read_records(p))
        .collect::<LayoutResult<Vec<Vec<Record>>>>()?;

    let num_reads = records
        .iter()
        .flat_map(|v| v.iter())
        .map(|r| r.max_rid())
        .max()
        .unwrap_or(0);

    let mut ri = ReadInfo::with_capacity(num_reads);
    let mut og = BestOverlapGraph::new(num_reads);
    let mut oc = OverlapCache::new(num_reads);
    let mut n_edges = 0_usize;
    for rec in records.into_iter().flatten() {
        match rec {
            Record::Read(rid, len) => ri.set_read_length(rid, len),
            Record::Best(rid, three_prime, edge) => {
                og.set_best_edge(rid, three_prime, edge);
                n_edges += 1;
            }
            Record::Flag(rid, flag) => og.set_flag(rid, flag),
            Record::Ovlp(o) => oc.add_overlap(o),
        }
    }

    log::info!(
        "load_layout_input: {} reads, {} bases, {} best edges, {} overlaps",
        ri.num_reads(),
        ri.num_bases(),
        n_edges,
        oc.num_overlaps()
    );
    Ok(LayoutInput { ri, og, oc })
}

/// `U utg_id n_reads length` then one `P utg_id rid bgn end` per read
pub fn write_layout<W: Write>(tigs: &TigVector, out: &mut W) -> LayoutResult<()> {
    for tig in tigs.iter() {
        writeln!(out, "U {} {} {}", tig.id(), tig.num_reads(), tig.length())?;
        for r in tig.path.iter() {
            writeln!(
                out,
                "P {} {} {} {}",
                tig.id(),
                r.ident,
                r.position.bgn,
                r.position.end
            )?;
        }
    }
    Ok(())
}

pub fn write_layout_file(tigs: &TigVector, filename: &str) -> LayoutResult<()> {
    let mut out = BufWriter::new(File::create(filename)?);
    write_layout(tigs, &mut out)?;
    out.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LengthSummary {
    pub total: usize,
    pub longest: usize,
    pub n50: usize,
    pub n90: usize,
    pub count: usize,
}

pub fn length_summary(mut lengths: Vec<usize>) -> LengthSummary {
    lengths.sort_unstable_by(|a, b| b.cmp(a));
    let total: usize = lengths.iter().sum();
    let mut summary = LengthSummary {
        total,
        longest: *lengths.first().unwrap_or(&0),
        count: lengths.len(),
        ..LengthSummary::default()
    };
    let mut cumsum = 0_usize;
    for l in lengths {
        cumsum += l;
        if summary.n50 == 0 && 2 * cumsum > total {
            summary.n50 = l;
        }
        if summary.n90 == 0 && 10 * cumsum > 9 * total {
            summary.n90 = l;
        }
    }
    summary
}

pub fn log_unitig_summary(tigs: &TigVector) -> LengthSummary {
    let summary = length_summary(tigs.iter().map(|t| t.length().max(0) as usize).collect());
    log::info!("Total size: {}", summary.total);
    log::info!("Longest size: {}", summary.longest);
    log::info!("N50: {}", summary.n50);
    log::info!("N90: {}", summary.n90);
    log::info!("Number of unitigs: {}", summary.count);
    summary
}
