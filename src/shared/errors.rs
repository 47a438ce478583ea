#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },
}
