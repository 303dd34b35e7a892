#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Hour,
    Day,
}

impl Bucket {
    /// SQL expression turning a normalized timestamp into its bucket label.
    pub(crate) fn label_sql(self) -> &'static str {
        match self {
            Bucket::Hour => "substr(timestamp, 1, 13) || ':00:00Z'",
            Bucket::Day => "substr(timestamp, 1, 10)",
        }
    }
}
