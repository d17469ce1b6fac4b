const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Drive search expression for non-trashed, non-folder files directly under
/// `folder_id` whose name contains `name_token`.
#[must_use]
pub fn package_query(folder_id: &str, name_token: &str) -> String {
    format!(
        "'{}' in parents and mimeType != '{FOLDER_MIME_TYPE}' and trashed = false and name contains '{}'",
        escape_literal(folder_id),
        escape_literal(name_token),
    )
}
