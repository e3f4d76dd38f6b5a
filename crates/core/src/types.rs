/// All timestamps are UTC; serialized as ISO-8601 at every boundary.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
