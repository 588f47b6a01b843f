//! Sprint report transformation: flat spreadsheet rows with discipline labels.

pub mod classifier;
pub mod discipline;
pub mod row;
pub mod sprint_name;

pub use classifier::{hyperlink_formula, IssueCategory, ReportClassifier};
pub use discipline::{
    DisciplineCache, DisciplineResolver, InMemoryDisciplineCache, TitleMatcher, OTHER_DISCIPLINE,
};
pub use row::SheetRow;
pub use sprint_name::{filter_sprints_by_year, simplify_sprint_name, sprint_year_pattern};
