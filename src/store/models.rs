use serde::Serialize;

/// A vacancy pulled from the job board and cached locally.
///
/// `description` stays empty until someone asks for the full text, the board
/// search endpoint only returns listing summaries.
#[derive(Debug, Clone, Serialize)]
pub struct Vacancy {
    pub id: usize,
    pub board_id: String,
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
}

impl Vacancy {
    pub fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Resume {
    pub id: usize,
    pub user_id: usize,
    pub content: String,
}
