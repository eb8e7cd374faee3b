// Stage filters and counts behind the dashboard tabs

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::model::{Case, Stage};
use crate::store::Predicate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StageFilter {
    #[default]
    All,
    New,
    Review,
    Igms,
    Ombudsman,
    Resolved,
    Rejected,
}

impl StageFilter {
    pub const ALL: [StageFilter; 7] = [
        StageFilter::All,
        StageFilter::New,
        StageFilter::Review,
        StageFilter::Igms,
        StageFilter::Ombudsman,
        StageFilter::Resolved,
        StageFilter::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageFilter::All => "all",
            StageFilter::New => "new",
            StageFilter::Review => "review",
            StageFilter::Igms => "igms",
            StageFilter::Ombudsman => "ombudsman",
            StageFilter::Resolved => "resolved",
            StageFilter::Rejected => "rejected",
        }
    }

    /// Stage `kind` tag this tab shows, `None` for every case
    fn kind(&self) -> Option<&'static str> {
        match self {
            StageFilter::All => None,
            StageFilter::New => Some(Stage::Created.kind()),
            StageFilter::Review => Some(Stage::UnderReview.kind()),
            StageFilter::Igms => Some(Stage::InIgms.kind()),
            StageFilter::Ombudsman => Some(Stage::InOmbudsman.kind()),
            StageFilter::Resolved => Some("resolved"),
            StageFilter::Rejected => Some("rejected"),
        }
    }

    /// Store predicates selecting this tab
    pub fn predicates(&self) -> Vec<Predicate> {
        self.kind()
            .map(|kind| vec![Predicate::equals("stage.kind", kind)])
            .unwrap_or_default()
    }

    pub fn matches(&self, stage: &Stage) -> bool {
        self.kind().map_or(true, |kind| stage.kind() == kind)
    }
}

impl fmt::Display for StageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageFilter::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown stage filter '{s}' (expected one of: {})",
                    StageFilter::ALL.map(|f| f.as_str()).join(", ")
                )
            })
    }
}

/// Number of cases on each dashboard tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub total: usize,
    pub new: usize,
    pub review: usize,
    pub igms: usize,
    pub ombudsman: usize,
    pub resolved: usize,
    pub rejected: usize,
}

impl StageCounts {
    pub fn tally<'a>(cases: impl IntoIterator<Item = &'a Case>) -> Self {
        let mut counts = StageCounts::default();
        for case in cases {
            counts.total += 1;
            match case.stage {
                Stage::Created => counts.new += 1,
                Stage::UnderReview => counts.review += 1,
                Stage::InIgms => counts.igms += 1,
                Stage::InOmbudsman => counts.ombudsman += 1,
                Stage::Resolved { .. } => counts.resolved += 1,
                Stage::Rejected { .. } => counts.rejected += 1,
            }
        }
        counts
    }

    pub fn get(&self, filter: StageFilter) -> usize {
        match filter {
            StageFilter::All => self.total,
            StageFilter::New => self.new,
            StageFilter::Review => self.review,
            StageFilter::Igms => self.igms,
            StageFilter::Ombudsman => self.ombudsman,
            StageFilter::Resolved => self.resolved,
            StageFilter::Rejected => self.rejected,
        }
    }
}
