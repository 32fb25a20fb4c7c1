use uuid::Uuid;

/// Random, filesystem-safe name stem: 32 lowercase hex characters.
pub fn unique_stem() -> String {
    Uuid::new_v4().simple().to_string()
}
