use chrono::Utc;
use nanoid::nanoid;

/// Generates a sortable id: `<prefix>_<unix millis>-<nanoid>`.
pub fn gen_id(prefix: &str, size: Option<usize>) -> String {
    let size = size.unwrap_or(16);

    let timestamp = Utc::now().timestamp_millis();
    let random_id = nanoid!(size);

    format!("{prefix}_{timestamp}-{random_id}")
}
