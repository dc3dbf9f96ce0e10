use thiserror::Error;

#[derive(Debug, Error)]
pub enum BooksError {
    #[error("row {index} does not exist, table has {len} rows")]
    RowOutOfRange { index: usize, len: usize },

    #[error("cannot read table {path}: {source}")]
    TableRead {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    #[error("value overflow")]
    ValueOverflow,
}
