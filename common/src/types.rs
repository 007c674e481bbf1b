//! Report data types
//!
//! Shared by the exporter, the report store and the CLI:
//! - ReportData: the form content handed to the pipeline at export time
//! - ReportKind: which administrative template is being exported
//! - StoredReport: the persisted record appended after a successful export

use serde::{Deserialize, Serialize};

/// Student counts per result band
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Totals {
    pub total_students: u32,
    pub excellent: u32,
    pub good: u32,
    pub average: u32,
    pub weak: u32,
}

impl Totals {
    /// Sum of the four bands
    pub fn banded_sum(&self) -> u32 {
        self.excellent + self.good + self.average + self.weak
    }

    /// Whether the bands account for every student
    pub fn is_consistent(&self) -> bool {
        self.banded_sum() == self.total_students
    }

    /// Band counts in display order, with their labels
    pub fn bands(&self) -> [(&'static str, u32); 4] {
        [
            ("ممتاز", self.excellent),
            ("جيد", self.good),
            ("متوسط", self.average),
            ("ضعيف", self.weak),
        ]
    }
}

/// Direction of a subject average compared with the previous term
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Up => "صاعد",
            Trend::Down => "نازل",
            Trend::Stable => "مستقر",
        }
    }
}

/// Evaluation band of an average out of 20
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Excellent,
    VeryGood,
    Good,
    Acceptable,
    Weak,
}

impl Evaluation {
    pub fn from_average(average: f64) -> Self {
        if average >= 16.0 {
            Evaluation::Excellent
        } else if average >= 14.0 {
            Evaluation::VeryGood
        } else if average >= 12.0 {
            Evaluation::Good
        } else if average >= 10.0 {
            Evaluation::Acceptable
        } else {
            Evaluation::Weak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Evaluation::Excellent => "ممتاز",
            Evaluation::VeryGood => "جيد جداً",
            Evaluation::Good => "جيد",
            Evaluation::Acceptable => "مقبول",
            Evaluation::Weak => "ضعيف",
        }
    }
}

/// One row of the subject analysis table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectStat {
    pub name: String,
    pub average: f64,
    pub trend: Trend,
}

impl SubjectStat {
    pub fn evaluation(&self) -> Evaluation {
        Evaluation::from_average(self.average)
    }
}

/// One row of the top performers table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopPerformer {
    pub student_name: String,
    pub average: f64,
}

/// Form content at export time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub title: String,

    #[serde(default)]
    pub school: String,

    #[serde(default)]
    pub level: String,

    #[serde(default)]
    pub semester: String,

    /// Overall average out of 20
    #[serde(default)]
    pub average: f64,

    #[serde(default)]
    pub totals: Totals,

    #[serde(default)]
    pub subjects: Vec<SubjectStat>,

    #[serde(default)]
    pub top_performers: Vec<TopPerformer>,

    #[serde(default)]
    pub report_date: String,

    #[serde(default)]
    pub counselor: String,

    #[serde(default)]
    pub notes: String,
}

impl ReportData {
    /// The ten best students, best first
    pub fn top_ten(&self) -> Vec<&TopPerformer> {
        let mut ranked: Vec<&TopPerformer> = self.top_performers.iter().collect();
        ranked.sort_by(|a, b| b.average.total_cmp(&a.average));
        ranked.truncate(10);
        ranked
    }
}

/// Administrative report templates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    StudentInformation,
    ParentInformation,
    AnnualActivity,
    #[default]
    ResultsAnalysis,
}

impl ReportKind {
    /// Heading printed on the cover page and stored as the record type
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::StudentInformation => "تقرير عملية الإعلام",
            ReportKind::ParentInformation => "تقرير عملية إعلام الأولياء",
            ReportKind::AnnualActivity => "التقرير السنوي للنشاطات",
            ReportKind::ResultsAnalysis => "تقرير تحليل النتائج",
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" | "student-information" => Ok(ReportKind::StudentInformation),
            "parent" | "parent-information" => Ok(ReportKind::ParentInformation),
            "annual" | "annual-activity" => Ok(ReportKind::AnnualActivity),
            "results" | "results-analysis" => Ok(ReportKind::ResultsAnalysis),
            _ => Err(format!(
                "Unknown report kind: {}. Use student, parent, annual or results",
                s
            )),
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::StudentInformation => write!(f, "student"),
            ReportKind::ParentInformation => write!(f, "parent"),
            ReportKind::AnnualActivity => write!(f, "annual"),
            ReportKind::ResultsAnalysis => write!(f, "results"),
        }
    }
}

/// Persisted export record; never mutated after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: serde_json::Value,
}
