/// A fresh v4 UUID, used for tool call ids a provider left out.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Eight hex characters tagging one orchestration run in the logs.
pub fn new_correlation_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
