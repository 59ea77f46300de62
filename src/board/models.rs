use serde::{Deserialize, Serialize};

/// A vacancy listing as returned by the board's search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardVacancy {
    pub id: String,
    pub name: String,
    pub alternate_url: Option<String>,
    pub salary: Option<BoardSalary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSalary {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub currency: Option<String>,
}

impl std::fmt::Display for BoardSalary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let currency = self.currency.as_deref().unwrap_or("");
        match (self.from, self.to) {
            (Some(from), Some(to)) => write!(f, "{}-{} {}", from, to, currency),
            (Some(from), None) => write!(f, "from {} {}", from, currency),
            (None, Some(to)) => write!(f, "up to {} {}", to, currency),
            (None, None) => write!(f, "not specified"),
        }
    }
}

/// Paged search response, only the items are interesting.
#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    pub items: Vec<BoardVacancy>,
}

/// Full vacancy payload, only the description is interesting.
#[derive(Debug, Deserialize)]
pub(super) struct VacancyDetails {
    #[serde(default)]
    pub description: Option<String>,
}
