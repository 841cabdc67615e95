//! Template catalog listings shared by the class and subject endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classes::Class;
use crate::subjects::Subject;

/// The two entities split into templates and school instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum CatalogKind {
    #[serde(rename = "classes")]
    Class,
    #[serde(rename = "subjects")]
    Subject,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CatalogRows {
    Classes(Vec<Class>),
    Subjects(Vec<Subject>),
}

impl CatalogRows {
    pub fn len(&self) -> usize {
        match self {
            CatalogRows::Classes(rows) => rows.len(),
            CatalogRows::Subjects(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parses_plural_path_segment() {
        let kind: CatalogKind = serde_json::from_str("\"classes\"").unwrap();
        assert_eq!(kind, CatalogKind::Class);
        let kind: CatalogKind = serde_json::from_str("\"subjects\"").unwrap();
        assert_eq!(kind, CatalogKind::Subject);
        assert!(serde_json::from_str::<CatalogKind>("\"class\"").is_err());
    }

    #[test]
    fn test_rows_serialize_as_plain_array() {
        let json = serde_json::to_value(CatalogRows::Subjects(vec![])).unwrap();
        assert_eq!(json, serde_json::json!([]));
    }
}
