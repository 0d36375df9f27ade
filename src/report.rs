//! Candidate and committed out-of-bounds reports.
//!
//! A candidate is recorded on the address value that produced a
//! suspicious index computation; it is only promoted ("committed") to the
//! process-wide log when that exact address is later consumed by a load
//! or store in the same call context.

use std::collections::HashMap;

use crate::context::Context;
use crate::instruction::ValueId;
use crate::interval::{INF, NEG_INF};

#[derive(Debug, Clone)]
pub struct CandidateReport {
    pub function: String,
    pub context: Context,
    pub line: u32,
    pub length_bound: usize,
    pub byte_range: (i64, i64),
}

pub type CommittedReport = CandidateReport;

#[derive(Debug, Default)]
pub struct Reports {
    potential: HashMap<Context, HashMap<ValueId, CandidateReport>>,
    committed: Vec<CommittedReport>,
}

impl Reports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_candidate(&mut self, context: &Context, addr: ValueId, report: CandidateReport) {
        self.potential.entry(context.clone()).or_default().insert(addr, report);
    }

    /// Promote the candidate recorded for `addr` in `context`, if any, to
    /// the committed log.
    pub fn commit(&mut self, context: &Context, addr: ValueId) {
        if let Some(by_addr) = self.potential.get(context) {
            if let Some(report) = by_addr.get(&addr) {
                self.committed.push(report.clone());
            }
        }
    }

    pub fn committed(&self) -> &[CommittedReport] {
        &self.committed
    }

    pub fn clear(&mut self) {
        self.potential.clear();
        self.committed.clear();
    }
}

fn fmt_bound(v: i64) -> String {
    if v <= NEG_INF {
        "-inf".to_string()
    } else if v >= INF {
        "inf".to_string()
    } else {
        v.to_string()
    }
}

/// Format a single committed report as a report line (§6):
/// `<ctx0>[:<ctx1>...]], <function>, <line>, <length>, <lo>:<hi>`, with the
/// context prefix (and its trailing comma) omitted entirely when empty.
pub fn format_line(report: &CommittedReport) -> String {
    let (lo, hi) = report.byte_range;
    let ctx = report.context.to_string();
    if ctx.is_empty() {
        format!(", {}, {}, {}, {}:{}", report.function, report.line, report.length_bound, fmt_bound(lo), fmt_bound(hi))
    } else {
        format!("{}, {}, {}, {}, {}:{}", ctx, report.function, report.line, report.length_bound, fmt_bound(lo), fmt_bound(hi))
    }
}
